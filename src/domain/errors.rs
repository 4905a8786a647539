//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("BGG request failed: {0}")]
    Remote(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Build directory error: {0}")]
    Build(String),

    /// The remote service answered but had no record for the requested id.
    #[error("Not found: {0}")]
    NotFound(String),
}
