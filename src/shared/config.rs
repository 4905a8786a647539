//! Application configuration. Users, date range, paths, image sizing.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Active Snowdonia Dragons attendees. Listed by hand rather than taken from
/// the guild, because some guild members never come to sessions.
pub const DEFAULT_USERS: &[&str] = &[
    "avlawn",
    "boyuki",
    "dheath3266",
    "Draddict",
    "Endenisia",
    "FungalBoar9",
    "Gaelgog",
    "Manicat",
    "MrJuggles",
    "NotBrian",
    "pebold",
    "ResidentGnome",
    "silverrobert",
    "Straight To Hell",
    "tomusher",
    "twrchtrwyth",
];

pub const DEFAULT_API_BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_IMAGE_WIDTH: u32 = 100;
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 500;
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// BGG user names. Comma-separated in SD_SUMMARY_USERS.
    #[serde(default)]
    pub users: Option<Vec<String>>,

    /// First day of plays to fetch (YYYY-MM-DD). Read from SD_SUMMARY_START_DATE.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last day of plays to fetch, inclusive. Read from SD_SUMMARY_END_DATE.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Game night ("Mon", "monday", ...). Read from SD_SUMMARY_WEEKDAY.
    #[serde(default)]
    pub weekday: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // BGG API
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Bearer token for a registered BGG application. Read from SD_SUMMARY_API_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Sleep in ms before every API request (BGG throttles hard). Default 1000.
    #[serde(default)]
    pub request_delay_ms: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────
    /// Smallest thumbnail width and the width step. Default 100.
    #[serde(default)]
    pub image_width: Option<u32>,

    /// Largest thumbnail width. Default 500.
    #[serde(default)]
    pub max_image_width: Option<u32>,

    #[serde(default)]
    pub jpeg_quality: Option<u8>,

    // ─────────────────────────────────────────────────────────────────────────
    // Paths
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub cache_path: Option<String>,
    #[serde(default)]
    pub image_cache_dir: Option<String>,
    #[serde(default)]
    pub build_dir: Option<String>,
    #[serde(default)]
    pub static_dir: Option<String>,
    #[serde(default)]
    pub template_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(
            config::Environment::with_prefix("SD_SUMMARY")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("users"),
        );
        if let Ok(path) = std::env::var("SD_SUMMARY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Configured users, or the Snowdonia Dragons list.
    pub fn users_or_default(&self) -> Vec<String> {
        match &self.users {
            Some(users) => users
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect(),
            None => DEFAULT_USERS.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// Defaults to 2014-01-01.
    pub fn start_date_or_default(&self) -> NaiveDate {
        self.start_date
            .or_else(|| NaiveDate::from_ymd_opt(2014, 1, 1))
            .unwrap_or_default()
    }

    /// Defaults to 2014-12-31.
    pub fn end_date_or_default(&self) -> NaiveDate {
        self.end_date
            .or_else(|| NaiveDate::from_ymd_opt(2014, 12, 31))
            .unwrap_or_default()
    }

    /// Parsed game night. Defaults to Monday.
    pub fn weekday_or_default(&self) -> Result<Weekday, ConfigValidationError> {
        match &self.weekday {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|_| ConfigValidationError(format!("unknown weekday {:?}", s))),
            None => Ok(Weekday::Mon),
        }
    }

    /// Configured title, or one derived from the date range and weekday.
    pub fn title_or_default(&self, weekday_name: &str) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        let start = self.start_date_or_default();
        let end = self.end_date_or_default();
        if start.year() == end.year() {
            format!("Snowdonia Dragons: {} games of {}", weekday_name, start.year())
        } else {
            format!(
                "Snowdonia Dragons: {} games, {} to {}",
                weekday_name,
                start.year(),
                end.year()
            )
        }
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// API token from config or SD_SUMMARY_API_TOKEN / BGG_API_TOKEN env.
    pub fn api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var("BGG_API_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS))
    }

    pub fn image_width_or_default(&self) -> u32 {
        self.image_width.unwrap_or(DEFAULT_IMAGE_WIDTH)
    }

    pub fn max_image_width_or_default(&self) -> u32 {
        self.max_image_width.unwrap_or(DEFAULT_MAX_IMAGE_WIDTH)
    }

    pub fn jpeg_quality_or_default(&self) -> u8 {
        self.jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY)
    }

    pub fn cache_path_or_default(&self) -> PathBuf {
        PathBuf::from(self.cache_path.as_deref().unwrap_or("cache.json"))
    }

    pub fn image_cache_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.image_cache_dir.as_deref().unwrap_or("imagecache"))
    }

    pub fn build_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.build_dir.as_deref().unwrap_or("build"))
    }

    pub fn static_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.static_dir.as_deref().unwrap_or("static"))
    }

    pub fn template_path_or_default(&self) -> PathBuf {
        PathBuf::from(
            self.template_path
                .as_deref()
                .unwrap_or("templates/index.html"),
        )
    }

    /// Reject settings that would make the build meaningless. Runs before any network call.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.users_or_default().is_empty() {
            return Err(ConfigValidationError("user list is empty".into()));
        }
        let (start, end) = (self.start_date_or_default(), self.end_date_or_default());
        if start > end {
            return Err(ConfigValidationError(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        let (min, max) = (self.image_width_or_default(), self.max_image_width_or_default());
        if min == 0 || min > max {
            return Err(ConfigValidationError(format!(
                "image widths must satisfy 0 < image_width ({}) <= max_image_width ({})",
                min, max
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality_or_default()) {
            return Err(ConfigValidationError(format!(
                "jpeg_quality {} not in 1..=100",
                self.jpeg_quality_or_default()
            )));
        }
        self.weekday_or_default()?;
        Ok(())
    }
}

/// A configuration value that parsed but makes no sense.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigValidationError(pub String);
