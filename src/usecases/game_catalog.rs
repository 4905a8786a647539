//! Cache-aware game metadata lookup.

use crate::domain::{DomainError, GameData, GameId};
use crate::ports::{BggGateway, GameCache};
use std::sync::Arc;
use tracing::debug;

/// Resolves game ids to metadata, hitting BGG only on a cache miss.
pub struct GameCatalog {
    gateway: Arc<dyn BggGateway>,
    cache: Arc<dyn GameCache>,
}

impl GameCatalog {
    pub fn new(gateway: Arc<dyn BggGateway>, cache: Arc<dyn GameCache>) -> Self {
        Self { gateway, cache }
    }

    pub async fn game(&self, game_id: GameId) -> Result<GameData, DomainError> {
        if let Some(game) = self.cache.get_game(game_id).await? {
            debug!(game_id, "game metadata cache hit");
            return Ok(game);
        }
        let game = self.gateway.fetch_game(game_id).await?;
        self.cache.put_game(&game).await?;
        Ok(game)
    }
}
