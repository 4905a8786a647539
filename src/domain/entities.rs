//! Domain entities. Pure data structures for the core business.
//!
//! No BGG/XML types here. Adapters map into these.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// BGG "thing" id of a game.
pub type GameId = u64;

/// Plays per user, users kept in input order.
pub type PlaysByUser = Vec<(String, Vec<PlaySession>)>;

/// A single logged play of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    pub id: u64,
    /// User whose play log this came from.
    pub user: String,
    pub date: NaiveDate,
    pub game_id: GameId,
    /// Name as recorded on the play, which may differ from the primary name.
    pub game_name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub length_minutes: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub incomplete: bool,
}

/// Game metadata. Treated as immutable upstream, so cached forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameData {
    pub id: GameId,
    pub name: String,
    pub expansion: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub year_published: Option<i32>,
}

/// One game in the report: how many distinct target-weekday days it was played.
#[derive(Debug, Clone)]
pub struct GameEntry {
    pub game_id: GameId,
    pub count: u32,
    /// One session per counted day, in the order they were seen.
    pub sessions: Vec<PlaySession>,
    pub game: GameData,
    /// Full-size cover in the image cache.
    pub image: PathBuf,
}

impl GameEntry {
    /// Counted days in calendar order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.sessions.iter().map(|s| s.date).collect();
        dates.sort();
        dates
    }
}

/// A resized cover written into the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub game_id: GameId,
    pub path: PathBuf,
    /// Link relative to the build directory (e.g. `images/13.jpg`).
    pub href: String,
    pub width: u32,
    pub height: u32,
}

/// Inclusive date range of plays to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Everything the renderer needs for one page.
#[derive(Debug, Clone)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    /// Sorted by game name, then id.
    pub entries: Vec<GameEntry>,
    pub thumbnails: HashMap<GameId, Thumbnail>,
}

impl Report {
    /// Sum of counted days across all games.
    pub fn session_count(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(date: &str) -> PlaySession {
        PlaySession {
            id: 1,
            user: "tomusher".to_string(),
            date: date.parse().unwrap(),
            game_id: 13,
            game_name: "Catan".to_string(),
            quantity: 1,
            length_minutes: 0,
            location: None,
            incomplete: false,
        }
    }

    #[test]
    fn test_entry_dates_sorted() {
        let entry = GameEntry {
            game_id: 13,
            count: 2,
            sessions: vec![session("2014-03-10"), session("2014-03-03")],
            game: GameData {
                id: 13,
                name: "Catan".to_string(),
                expansion: false,
                image_url: None,
                thumbnail_url: None,
                year_published: None,
            },
            image: PathBuf::from("imagecache/13.jpg"),
        };
        let dates: Vec<String> = entry.dates().iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2014-03-03", "2014-03-10"]);
    }

    #[test]
    fn test_session_deserializes_without_optional_fields() {
        let json = r#"{"id":5,"user":"avlawn","date":"2014-03-03","game_id":13,"game_name":"Catan"}"#;
        let s: PlaySession = serde_json::from_str(json).unwrap();
        assert_eq!(s.quantity, 0);
        assert!(s.location.is_none());
        assert!(!s.incomplete);
    }

    #[test]
    fn test_date_range_contains_bounds() {
        let range = DateRange::new(
            "2014-01-01".parse().unwrap(),
            "2014-12-31".parse().unwrap(),
        );
        assert!(range.contains("2014-01-01".parse().unwrap()));
        assert!(range.contains("2014-12-31".parse().unwrap()));
        assert!(!range.contains("2015-01-01".parse().unwrap()));
        assert_eq!(range.to_string(), "2014-01-01 to 2014-12-31");
    }
}
