//! Full-size cover images, downloaded once into the image cache directory.

use crate::domain::{DomainError, GameId};
use crate::ports::BggGateway;
use crate::usecases::GameCatalog;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct CoverService {
    gateway: Arc<dyn BggGateway>,
    catalog: Arc<GameCatalog>,
    cache_dir: PathBuf,
}

impl CoverService {
    pub fn new(gateway: Arc<dyn BggGateway>, catalog: Arc<GameCatalog>, cache_dir: PathBuf) -> Self {
        Self {
            gateway,
            catalog,
            cache_dir,
        }
    }

    /// Deterministic cache path for a game's cover.
    pub fn path_for(&self, game_id: GameId) -> PathBuf {
        self.cache_dir.join(format!("{}.jpg", game_id))
    }

    /// Path to the cached full-size cover, downloading it on first use.
    pub async fn full_image(&self, game_id: GameId) -> Result<PathBuf, DomainError> {
        let dest = self.path_for(game_id);
        let cached = fs::try_exists(&dest)
            .await
            .map_err(|e| DomainError::Image(format!("check {}: {}", dest.display(), e)))?;
        if cached {
            debug!(game_id, path = %dest.display(), "found cached image");
            return Ok(dest);
        }

        let game = self.catalog.game(game_id).await?;
        let url = game
            .image_url
            .ok_or_else(|| DomainError::Image(format!("game {} has no cover image", game_id)))?;

        fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            DomainError::Image(format!("create {}: {}", self.cache_dir.display(), e))
        })?;
        info!(game_id, url = %url, "downloading image");
        self.gateway.download(&url, &dest).await?;
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeGateway, MemoryCache, game, scratch_dir};

    fn covers(gateway: Arc<FakeGateway>, dir: PathBuf) -> CoverService {
        let catalog = Arc::new(GameCatalog::new(
            gateway.clone(),
            Arc::new(MemoryCache::default()),
        ));
        CoverService::new(gateway, catalog, dir)
    }

    #[tokio::test]
    async fn test_downloads_once() {
        let dir = scratch_dir("covers_once");
        let gateway = Arc::new(FakeGateway::new().with_game(game(13, "Catan", false)));
        let covers = covers(gateway.clone(), dir.join("imagecache"));

        let path = covers.full_image(13).await.unwrap();
        assert_eq!(path, dir.join("imagecache/13.jpg"));
        assert!(path.exists());
        covers.full_image(13).await.unwrap();
        assert_eq!(gateway.download_calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_file_skips_metadata_and_download() {
        let dir = scratch_dir("covers_existing");
        std::fs::write(dir.join("822.jpg"), b"cached").unwrap();
        let gateway = Arc::new(FakeGateway::new());
        let covers = covers(gateway.clone(), dir.clone());

        assert_eq!(covers.full_image(822).await.unwrap(), dir.join("822.jpg"));
        assert_eq!(gateway.game_calls(), 0);
        assert_eq!(gateway.download_calls(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_cache_dir_is_error_not_redownload() {
        let dir = scratch_dir("covers_bad_dir");
        let not_a_dir = dir.join("imagecache");
        std::fs::write(&not_a_dir, b"file").unwrap();
        let gateway = Arc::new(FakeGateway::new().with_game(game(13, "Catan", false)));
        let covers = covers(gateway.clone(), not_a_dir);

        let err = covers.full_image(13).await.unwrap_err();
        assert!(matches!(err, DomainError::Image(_)));
        assert_eq!(gateway.game_calls(), 0);
        assert_eq!(gateway.download_calls(), 0);
    }

    #[tokio::test]
    async fn test_game_without_image_is_error() {
        let dir = scratch_dir("covers_no_image");
        let mut bare = game(5, "Prototype", false);
        bare.image_url = None;
        let covers = covers(Arc::new(FakeGateway::new().with_game(bare)), dir);
        let err = covers.full_image(5).await.unwrap_err();
        assert!(matches!(err, DomainError::Image(_)));
    }
}
