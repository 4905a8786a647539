//! Infrastructure adapters. Implement outbound ports.
//!
//! BGG, JSON cache, images, HTML, build directory, terminal. Map errors to DomainError.

pub mod bgg;
pub mod imaging;
pub mod output;
pub mod persistence;
pub mod report;
pub mod ui;
