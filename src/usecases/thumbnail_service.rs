//! Resizes each game's cover so its width reflects how often it was played.

use crate::domain::{DomainError, GameEntry, GameId, Thumbnail, ThumbnailScale, thumbnail_height};
use crate::ports::{BuildOutput, ImageProcessor, ProgressPort};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ThumbnailService {
    images: Arc<dyn ImageProcessor>,
    output: Arc<dyn BuildOutput>,
    progress: Arc<dyn ProgressPort>,
    scale: ThumbnailScale,
}

impl ThumbnailService {
    pub fn new(
        images: Arc<dyn ImageProcessor>,
        output: Arc<dyn BuildOutput>,
        progress: Arc<dyn ProgressPort>,
        scale: ThumbnailScale,
    ) -> Self {
        Self {
            images,
            output,
            progress,
            scale,
        }
    }

    /// Write one thumbnail per entry into the build images directory.
    /// No entries, no work.
    pub fn resize_images(
        &self,
        entries: &[GameEntry],
    ) -> Result<HashMap<GameId, Thumbnail>, DomainError> {
        let Some(most_played) = entries.iter().map(|e| e.count).max() else {
            info!("no games to resize");
            return Ok(HashMap::new());
        };

        let images_dir = self.output.images_dir();
        let mut thumbnails = HashMap::with_capacity(entries.len());
        self.progress.start("images", entries.len());
        for entry in entries {
            let width = self.scale.width_for(entry.count, most_played);
            let (src_w, src_h) = self.images.dimensions(&entry.image)?;
            let height = thumbnail_height(src_w, src_h, width);

            let file_name = format!("{}.jpg", entry.game_id);
            let path = images_dir.join(&file_name);
            self.images.resize(&entry.image, &path, width, height)?;
            debug!(game_id = entry.game_id, count = entry.count, width, height, "thumbnail written");

            thumbnails.insert(
                entry.game_id,
                Thumbnail {
                    game_id: entry.game_id,
                    path,
                    href: self.output.image_href(&file_name),
                    width,
                    height,
                },
            );
            self.progress.advance(&entry.game.name);
        }
        self.progress.finish();
        info!(count = thumbnails.len(), most_played, "resized images");
        Ok(thumbnails)
    }
}
