//! Build orchestration: reset output -> fetch plays -> aggregate -> thumbnails -> render -> write.
//!
//! Strictly sequential. The first error aborts the build and is returned as is.

use crate::domain::{DateRange, DomainError, Report};
use crate::ports::{BuildOutput, ReportRenderer};
use crate::usecases::{Aggregator, PlaysService, ThumbnailService};
use chrono::Weekday;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What to build.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub users: Vec<String>,
    pub range: DateRange,
    pub weekday: Weekday,
    pub title: String,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub users: usize,
    pub sessions_fetched: usize,
    pub games: usize,
    pub nights: u32,
    pub index_path: PathBuf,
}

pub struct BuildService {
    output: Arc<dyn BuildOutput>,
    plays: Arc<PlaysService>,
    aggregator: Arc<Aggregator>,
    thumbnails: Arc<ThumbnailService>,
    renderer: Arc<dyn ReportRenderer>,
    settings: BuildSettings,
}

impl BuildService {
    pub fn new(
        output: Arc<dyn BuildOutput>,
        plays: Arc<PlaysService>,
        aggregator: Arc<Aggregator>,
        thumbnails: Arc<ThumbnailService>,
        renderer: Arc<dyn ReportRenderer>,
        settings: BuildSettings,
    ) -> Self {
        Self {
            output,
            plays,
            aggregator,
            thumbnails,
            renderer,
            settings,
        }
    }

    pub async fn run(&self) -> Result<BuildSummary, DomainError> {
        let settings = &self.settings;
        self.output.prepare().await?;

        let by_user = self
            .plays
            .plays_for_users(&settings.users, settings.range)
            .await?;
        let sessions_fetched = by_user.iter().map(|(_, p)| p.len()).sum();
        info!(
            users = by_user.len(),
            sessions = sessions_fetched,
            "fetched plays"
        );

        let entries = self.aggregator.aggregate(&by_user, settings.weekday).await?;
        if entries.is_empty() {
            warn!(weekday = %settings.weekday, range = %settings.range, "no qualifying sessions, report will be empty");
        }

        let thumbnails = self.thumbnails.resize_images(&entries)?;
        let report = Report {
            title: settings.title.clone(),
            subtitle: format!(
                "{}s, {}",
                weekday_name(settings.weekday),
                settings.range
            ),
            entries,
            thumbnails,
        };
        let html = self.renderer.render(&report)?;
        let index_path = self.output.write_index(&html).await?;

        Ok(BuildSummary {
            users: by_user.len(),
            sessions_fetched,
            games: report.entries.len(),
            nights: report.session_count(),
            index_path,
        })
    }
}

/// Full English weekday name.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
