//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into services, run the build.
//! No business logic here.

use anyhow::Context;
use dotenv::dotenv;
use sd_year_summary::adapters::bgg::BggClient;
use sd_year_summary::adapters::imaging::JpegResizer;
use sd_year_summary::adapters::output::BuildDir;
use sd_year_summary::adapters::persistence::JsonCache;
use sd_year_summary::adapters::report::HtmlTemplateRenderer;
use sd_year_summary::adapters::ui::IndicatifProgress;
use sd_year_summary::domain::{DateRange, ThumbnailScale};
use sd_year_summary::ports::{
    BggGateway, BuildOutput, GameCache, PlaysCache, ProgressPort, ReportRenderer,
};
use sd_year_summary::shared::config::AppConfig;
use sd_year_summary::usecases::{
    Aggregator, BuildService, BuildSettings, CoverService, GameCatalog, PlaysService,
    ThumbnailService, weekday_name,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// One thread, one request in flight at a time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    let cfg = AppConfig::load().context("load configuration")?;
    cfg.validate()?;

    let weekday = cfg.weekday_or_default()?;
    let range = DateRange::new(cfg.start_date_or_default(), cfg.end_date_or_default());
    let users = cfg.users_or_default();
    info!(
        users = users.len(),
        %range,
        weekday = %weekday,
        "building report"
    );

    // --- Cache (plays by user, games by id) ---
    let cache_path = cfg.cache_path_or_default();
    let cache = Arc::new(JsonCache::new(&cache_path));
    cache
        .load()
        .await
        .with_context(|| format!("open cache {}", cache_path.display()))?;
    let plays_cache: Arc<dyn PlaysCache> = cache.clone();
    let game_cache: Arc<dyn GameCache> = cache;

    // --- BGG gateway (throttled) ---
    let request_delay = cfg.request_delay();
    info!(
        delay_ms = request_delay.as_millis() as u64,
        token = cfg.api_token().is_some(),
        "BGG rate limit: {} ms before each request",
        request_delay.as_millis()
    );
    let gateway: Arc<dyn BggGateway> = Arc::new(BggClient::new(
        cfg.api_base_url_or_default(),
        cfg.api_token(),
        request_delay,
    )?);

    // --- Output, images, template ---
    let output: Arc<dyn BuildOutput> = Arc::new(BuildDir::new(
        cfg.build_dir_or_default(),
        cfg.static_dir_or_default(),
    ));
    let renderer: Arc<dyn ReportRenderer> = Arc::new(HtmlTemplateRenderer::from_file(
        &cfg.template_path_or_default(),
    )?);
    let progress: Arc<dyn ProgressPort> = Arc::new(IndicatifProgress::new());

    // --- Services ---
    let catalog = Arc::new(GameCatalog::new(Arc::clone(&gateway), game_cache));
    let covers = Arc::new(CoverService::new(
        Arc::clone(&gateway),
        Arc::clone(&catalog),
        cfg.image_cache_dir_or_default(),
    ));
    let plays = Arc::new(PlaysService::new(
        Arc::clone(&gateway),
        plays_cache,
        Arc::clone(&progress),
    ));
    let aggregator = Arc::new(Aggregator::new(catalog, covers));
    let thumbnails = Arc::new(ThumbnailService::new(
        Arc::new(JpegResizer::new(cfg.jpeg_quality_or_default())),
        Arc::clone(&output),
        progress,
        ThumbnailScale::new(cfg.image_width_or_default(), cfg.max_image_width_or_default()),
    ));

    let build = BuildService::new(
        output,
        plays,
        aggregator,
        thumbnails,
        renderer,
        BuildSettings {
            users,
            range,
            weekday,
            title: cfg.title_or_default(weekday_name(weekday)),
        },
    );

    let summary = build.run().await?;
    info!(
        users = summary.users,
        sessions = summary.sessions_fetched,
        games = summary.games,
        nights = summary.nights,
        path = %summary.index_path.display(),
        "report built"
    );

    Ok(())
}
