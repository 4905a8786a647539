//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DateRange, DomainError, GameData, GameId, PlaySession, Report};
use std::path::{Path, PathBuf};

/// BoardGameGeek API gateway. Play logs, game metadata, cover downloads.
#[async_trait::async_trait]
pub trait BggGateway: Send + Sync {
    /// Fetch every play `user` logged within `range`, following pagination.
    /// Unknown users and empty logs both yield an empty list.
    async fn fetch_plays(
        &self,
        user: &str,
        range: DateRange,
    ) -> Result<Vec<PlaySession>, DomainError>;

    /// Fetch metadata for one game. `DomainError::NotFound` if BGG has no such item.
    async fn fetch_game(&self, game_id: GameId) -> Result<GameData, DomainError>;

    /// Download `url` to `dest`. `dest` only appears once the body is complete.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DomainError>;
}

/// Cache of fetched play logs, keyed by user name.
#[async_trait::async_trait]
pub trait PlaysCache: Send + Sync {
    async fn get_plays(&self, user: &str) -> Result<Option<Vec<PlaySession>>, DomainError>;

    /// Store a user's plays. An existing entry is kept as is.
    async fn put_plays(&self, user: &str, plays: &[PlaySession]) -> Result<(), DomainError>;
}

/// Cache of game metadata, keyed by game id.
#[async_trait::async_trait]
pub trait GameCache: Send + Sync {
    async fn get_game(&self, game_id: GameId) -> Result<Option<GameData>, DomainError>;

    /// Store a game. An existing entry is kept as is.
    async fn put_game(&self, game: &GameData) -> Result<(), DomainError>;
}

/// Image decoding and resizing.
pub trait ImageProcessor: Send + Sync {
    /// Pixel dimensions (width, height) of the image at `path`.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), DomainError>;

    /// Resize `src` to exactly `width` x `height` and write it to `dest`.
    fn resize(&self, src: &Path, dest: &Path, width: u32, height: u32) -> Result<(), DomainError>;
}

/// Turns the aggregated report into a page.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &Report) -> Result<String, DomainError>;
}

/// The build output tree (`build/` and its subdirectories).
#[async_trait::async_trait]
pub trait BuildOutput: Send + Sync {
    /// Wipe and recreate the output tree, including copied static assets.
    async fn prepare(&self) -> Result<(), DomainError>;

    /// Directory thumbnails are written to.
    fn images_dir(&self) -> PathBuf;

    /// Link for a file in `images_dir`, relative to the page.
    fn image_href(&self, file_name: &str) -> String;

    /// Write the rendered page. Returns its path.
    async fn write_index(&self, html: &str) -> Result<PathBuf, DomainError>;
}

/// Progress feedback for long, throttled stages.
pub trait ProgressPort: Send + Sync {
    fn start(&self, label: &str, total: usize);
    fn advance(&self, item: &str);
    fn finish(&self);
}
