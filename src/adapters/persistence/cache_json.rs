//! Implements PlaysCache and GameCache using one JSON file.
//!
//! Two typed maps (`plays` by user name, `games` by game id) so user names and
//! game ids never share a key space. Entries are write-once: a put on an
//! existing key leaves the stored value alone, so stale upstream data is
//! served until the file is deleted by hand.

use crate::domain::{DomainError, GameData, GameId, PlaySession};
use crate::ports::{GameCache, PlaysCache};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// On-disk layout. BTreeMap keeps the file byte-stable across runs.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheData {
    #[serde(default)]
    plays: BTreeMap<String, Vec<PlaySession>>,
    #[serde(default)]
    games: BTreeMap<GameId, GameData>,
}

/// JSON file-based cache of BGG responses.
pub struct JsonCache {
    path: PathBuf,
    cache: tokio::sync::RwLock<CacheData>,
    /// Set when the file on disk could not be loaded. Saving would replace it
    /// with whatever little this run has fetched, so writes are refused.
    load_failed: AtomicBool,
}

impl JsonCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(CacheData::default()),
            load_failed: AtomicBool::new(false),
        }
    }

    /// Load cache from disk. A missing file starts empty. A file that cannot be
    /// read or parsed is an error and is left untouched.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match self.read().await {
            Ok(data) => data,
            Err(e) => {
                self.load_failed.store(true, Ordering::SeqCst);
                return Err(e);
            }
        };
        info!(
            path = %self.path.display(),
            users = data.plays.len(),
            games = data.games.len(),
            "loaded cache"
        );
        *self.cache.write().await = data;
        self.load_failed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self) -> Result<CacheData, DomainError> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).map_err(|e| {
                DomainError::Cache(format!(
                    "parse {}: {} (fix or delete the file)",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file yet");
                Ok(CacheData::default())
            }
            Err(e) => Err(DomainError::Cache(format!(
                "read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self) -> Result<(), DomainError> {
        if self.load_failed.load(Ordering::SeqCst) {
            return Err(DomainError::Cache(format!(
                "{} failed to load, refusing to overwrite it",
                self.path.display()
            )));
        }
        let json = {
            let data = self.cache.read().await;
            serde_json::to_vec_pretty(&*data).map_err(|e| DomainError::Cache(e.to_string()))?
        };
        replace_file(&self.path, &json)
            .await
            .map_err(|e| DomainError::Cache(format!("save {}: {}", self.path.display(), e)))
    }
}

/// Swap `path` for a file holding `bytes`. Readers see the old file or the new
/// one, never a partial write.
async fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    let staged = path.with_extension("json.tmp");
    let mut f = fs::File::create(&staged).await?;
    f.write_all(bytes).await?;
    f.sync_all().await?;
    drop(f);
    fs::rename(&staged, path).await
}

#[async_trait::async_trait]
impl PlaysCache for JsonCache {
    async fn get_plays(&self, user: &str) -> Result<Option<Vec<PlaySession>>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.plays.get(user).cloned())
    }

    async fn put_plays(&self, user: &str, plays: &[PlaySession]) -> Result<(), DomainError> {
        {
            let mut cache = self.cache.write().await;
            if cache.plays.contains_key(user) {
                debug!(user, "plays already cached, keeping existing entry");
                return Ok(());
            }
            cache.plays.insert(user.to_string(), plays.to_vec());
        }
        self.save().await
    }
}

#[async_trait::async_trait]
impl GameCache for JsonCache {
    async fn get_game(&self, game_id: GameId) -> Result<Option<GameData>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.games.get(&game_id).cloned())
    }

    async fn put_game(&self, game: &GameData) -> Result<(), DomainError> {
        {
            let mut cache = self.cache.write().await;
            if cache.games.contains_key(&game.id) {
                debug!(game_id = game.id, "game already cached, keeping existing entry");
                return Ok(());
            }
            cache.games.insert(game.id, game.clone());
        }
        self.save().await
    }
}
