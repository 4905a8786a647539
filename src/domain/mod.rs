//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod thumbnail;

pub use entities::{
    DateRange, GameData, GameEntry, GameId, PlaySession, PlaysByUser, Report, Thumbnail,
};
pub use errors::DomainError;
pub use thumbnail::{ThumbnailScale, thumbnail_height};
