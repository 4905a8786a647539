//! Counts, per game, the distinct target-weekday dates it was played on.
//!
//! - Sessions from all users are walked in one flat sequence (users in input order)
//! - A date counts once per game, however many users logged it
//! - Expansions are dropped
//! - Output is sorted by game name, then id

use crate::domain::{DomainError, GameEntry, GameId, PlaysByUser};
use crate::usecases::{CoverService, GameCatalog};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

pub struct Aggregator {
    catalog: Arc<GameCatalog>,
    covers: Arc<CoverService>,
}

impl Aggregator {
    pub fn new(catalog: Arc<GameCatalog>, covers: Arc<CoverService>) -> Self {
        Self { catalog, covers }
    }

    pub async fn aggregate(
        &self,
        plays: &PlaysByUser,
        weekday: Weekday,
    ) -> Result<Vec<GameEntry>, DomainError> {
        let mut entries: Vec<GameEntry> = Vec::new();
        let mut index: HashMap<GameId, usize> = HashMap::new();
        let mut counted: HashMap<GameId, HashSet<NaiveDate>> = HashMap::new();
        let mut expansions = 0usize;

        for session in plays.iter().flat_map(|(_, sessions)| sessions) {
            // Checked before the metadata lookup so off-day games are never fetched.
            if session.date.weekday() != weekday {
                continue;
            }
            let game = self.catalog.game(session.game_id).await?;
            if game.expansion {
                debug!(game_id = session.game_id, name = %game.name, "skipping expansion");
                expansions += 1;
                continue;
            }
            if !counted
                .entry(session.game_id)
                .or_default()
                .insert(session.date)
            {
                continue;
            }

            match index.get(&session.game_id) {
                Some(&i) => {
                    let entry = &mut entries[i];
                    entry.count += 1;
                    entry.sessions.push(session.clone());
                }
                None => {
                    let image = self.covers.full_image(session.game_id).await?;
                    index.insert(session.game_id, entries.len());
                    entries.push(GameEntry {
                        game_id: session.game_id,
                        count: 1,
                        sessions: vec![session.clone()],
                        game,
                        image,
                    });
                }
            }
        }

        entries.sort_by(|a, b| {
            a.game
                .name
                .cmp(&b.game.name)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        info!(
            games = entries.len(),
            nights = entries.iter().map(|e| e.count).sum::<u32>(),
            expansions_skipped = expansions,
            weekday = %weekday,
            "aggregated sessions"
        );
        Ok(entries)
    }
}
