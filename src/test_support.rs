//! Fixtures and in-memory fakes shared by unit tests.

use crate::domain::{
    DateRange, DomainError, GameData, GameEntry, GameId, PlaySession, Thumbnail,
};
use crate::ports::{BggGateway, GameCache, ImageProcessor, PlaysCache};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

static SCRATCH_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Fresh empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let seq = SCRATCH_SEQ.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir()
        .join("sd-year-summary-tests")
        .join(format!("{}-{}-{}", name, std::process::id(), seq));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn range_2014() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(),
    )
}

pub fn session(id: u64, user: &str, game_id: GameId, date: &str) -> PlaySession {
    PlaySession {
        id,
        user: user.to_string(),
        date: date.parse().unwrap(),
        game_id,
        game_name: format!("game {}", game_id),
        quantity: 1,
        length_minutes: 60,
        location: None,
        incomplete: false,
    }
}

pub fn game(id: GameId, name: &str, expansion: bool) -> GameData {
    GameData {
        id,
        name: name.to_string(),
        expansion,
        image_url: Some(format!("https://cf.geekdo-images.com/images/{}.jpg", id)),
        thumbnail_url: None,
        year_published: None,
    }
}

/// Entry with one session per date; count matches the dates.
pub fn entry(id: GameId, name: &str, dates: &[&str]) -> GameEntry {
    GameEntry {
        game_id: id,
        count: dates.len() as u32,
        sessions: dates
            .iter()
            .enumerate()
            .map(|(i, d)| session(i as u64, "tomusher", id, d))
            .collect(),
        game: game(id, name, false),
        image: PathBuf::from(format!("imagecache/{}.jpg", id)),
    }
}

pub fn thumbnail(id: GameId, width: u32, height: u32) -> Thumbnail {
    Thumbnail {
        game_id: id,
        path: PathBuf::from(format!("build/images/{}.jpg", id)),
        href: format!("images/{}.jpg", id),
        width,
        height,
    }
}

/// Solid-colour JPEG of the given size.
pub fn write_cover(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// In-memory BGG with call counters.
#[derive(Default)]
pub struct FakeGateway {
    plays: HashMap<String, Vec<PlaySession>>,
    games: HashMap<GameId, GameData>,
    failing_users: HashSet<String>,
    plays_calls: AtomicUsize,
    game_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plays(mut self, user: &str, plays: Vec<PlaySession>) -> Self {
        self.plays.insert(user.to_string(), plays);
        self
    }

    pub fn with_game(mut self, game: GameData) -> Self {
        self.games.insert(game.id, game);
        self
    }

    pub fn failing_plays(mut self, user: &str) -> Self {
        self.failing_users.insert(user.to_string());
        self
    }

    pub fn plays_calls(&self) -> usize {
        self.plays_calls.load(Ordering::SeqCst)
    }

    pub fn game_calls(&self) -> usize {
        self.game_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BggGateway for FakeGateway {
    async fn fetch_plays(
        &self,
        user: &str,
        _range: DateRange,
    ) -> Result<Vec<PlaySession>, DomainError> {
        self.plays_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.contains(user) {
            return Err(DomainError::Remote(format!("plays for {} failed", user)));
        }
        Ok(self.plays.get(user).cloned().unwrap_or_default())
    }

    async fn fetch_game(&self, game_id: GameId) -> Result<GameData, DomainError> {
        self.game_calls.fetch_add(1, Ordering::SeqCst);
        self.games
            .get(&game_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("game {}", game_id)))
    }

    async fn download(&self, _url: &str, dest: &Path) -> Result<(), DomainError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        std::fs::write(dest, b"cover").map_err(|e| DomainError::Image(e.to_string()))
    }
}

/// In-memory cache with the same write-once rule as the JSON cache.
#[derive(Default)]
pub struct MemoryCache {
    plays: Mutex<HashMap<String, Vec<PlaySession>>>,
    games: Mutex<HashMap<GameId, GameData>>,
}

#[async_trait::async_trait]
impl PlaysCache for MemoryCache {
    async fn get_plays(&self, user: &str) -> Result<Option<Vec<PlaySession>>, DomainError> {
        Ok(self.plays.lock().unwrap().get(user).cloned())
    }

    async fn put_plays(&self, user: &str, plays: &[PlaySession]) -> Result<(), DomainError> {
        self.plays
            .lock()
            .unwrap()
            .entry(user.to_string())
            .or_insert_with(|| plays.to_vec());
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameCache for MemoryCache {
    async fn get_game(&self, game_id: GameId) -> Result<Option<GameData>, DomainError> {
        Ok(self.games.lock().unwrap().get(&game_id).cloned())
    }

    async fn put_game(&self, game: &GameData) -> Result<(), DomainError> {
        self.games
            .lock()
            .unwrap()
            .entry(game.id)
            .or_insert_with(|| game.clone());
        Ok(())
    }
}

/// Reports fixed source dimensions and records resize requests.
pub struct FakeImages {
    size: (u32, u32),
    resized: Mutex<Vec<(PathBuf, u32, u32)>>,
}

impl FakeImages {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            resized: Mutex::new(Vec::new()),
        }
    }

    pub fn resized(&self) -> Vec<(PathBuf, u32, u32)> {
        self.resized.lock().unwrap().clone()
    }
}

impl ImageProcessor for FakeImages {
    fn dimensions(&self, _path: &Path) -> Result<(u32, u32), DomainError> {
        Ok(self.size)
    }

    fn resize(&self, _src: &Path, dest: &Path, width: u32, height: u32) -> Result<(), DomainError> {
        self.resized
            .lock()
            .unwrap()
            .push((dest.to_path_buf(), width, height));
        Ok(())
    }
}
