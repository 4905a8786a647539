//! Application use cases. Orchestrate domain logic via ports.

pub mod aggregator;
pub mod build_service;
pub mod cover_service;
pub mod game_catalog;
pub mod plays_service;
pub mod thumbnail_service;

pub use aggregator::Aggregator;
pub use build_service::{BuildService, BuildSettings, BuildSummary, weekday_name};
pub use cover_service::CoverService;
pub use game_catalog::GameCatalog;
pub use plays_service::PlaysService;
pub use thumbnail_service::ThumbnailService;
