//! Implements BggGateway over the BGG XML API v2.
//!
//! BGG throttles aggressively, so every API request is preceded by a fixed
//! sleep. There is no retry: a failed request aborts the run.

use crate::adapters::bgg::mapper;
use crate::domain::{DateRange, DomainError, GameData, GameId, PlaySession};
use crate::ports::BggGateway;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// BGG gateway adapter.
pub struct BggClient {
    client: Client,
    base_url: String,
    /// Bearer token for registered API applications.
    api_token: Option<String>,
    /// Sleep before each API request.
    request_delay: Duration,
}

impl BggClient {
    /// `base_url` is the XML API root, e.g. `https://boardgamegeek.com/xmlapi2`.
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        request_delay: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DomainError::Remote(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            request_delay,
        })
    }

    /// Throttled GET of an API endpoint. Returns the body text.
    async fn get_xml(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, DomainError> {
        tokio::time::sleep(self.request_delay).await;

        let url = format!("{}/{}", self.base_url, endpoint);
        let mut req = self.client.get(&url).query(query);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let res = req
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("GET {}: {}", url, e)))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(DomainError::Remote(format!(
                "{} returned {}: {}",
                url,
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        res.text()
            .await
            .map_err(|e| DomainError::Remote(format!("read body of {}: {}", url, e)))
    }
}

#[async_trait]
impl BggGateway for BggClient {
    async fn fetch_plays(
        &self,
        user: &str,
        range: DateRange,
    ) -> Result<Vec<PlaySession>, DomainError> {
        let mut plays = Vec::new();
        let mut seen = 0usize;
        let mut page = 1u32;

        loop {
            let body = self
                .get_xml(
                    "plays",
                    &[
                        ("username", user.to_string()),
                        ("mindate", range.start.format("%Y-%m-%d").to_string()),
                        ("maxdate", range.end.format("%Y-%m-%d").to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let parsed = mapper::plays_page(user, &body, range)?;
            debug!(
                user,
                page,
                total = parsed.total,
                on_page = parsed.raw_len,
                "fetched plays page"
            );

            seen += parsed.raw_len;
            plays.extend(parsed.plays);

            if parsed.raw_len < mapper::PLAYS_PAGE_SIZE || seen >= parsed.total {
                break;
            }
            page += 1;
        }

        info!(user, count = plays.len(), pages = page, "fetched plays from BGG");
        Ok(plays)
    }

    async fn fetch_game(&self, game_id: GameId) -> Result<GameData, DomainError> {
        let body = self
            .get_xml("thing", &[("id", game_id.to_string())])
            .await?;
        let game = mapper::game(game_id, &body)?;
        info!(game_id, name = %game.name, expansion = game.expansion, "fetched game from BGG");
        Ok(game)
    }

    /// Streams the body to `<dest>.part`, then renames it into place.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), DomainError> {
        let url = mapper::absolute_image_url(url);
        let mut res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("GET {}: {}", url, e)))?;
        if !res.status().is_success() {
            return Err(DomainError::Remote(format!(
                "{} returned {}",
                url,
                res.status()
            )));
        }

        let mut part = dest.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);

        let written = match stream_to_file(&mut res, &url, &part).await {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                return Err(e);
            }
        };
        fs::rename(&part, dest)
            .await
            .map_err(|e| DomainError::Image(format!("rename into {}: {}", dest.display(), e)))?;
        debug!(url = %url, path = %dest.display(), bytes = written, "downloaded");
        Ok(())
    }
}

/// Copy a response body into `path` chunk by chunk. Returns the byte count.
async fn stream_to_file(
    res: &mut reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<usize, DomainError> {
    let mut f = fs::File::create(path)
        .await
        .map_err(|e| DomainError::Image(format!("create {}: {}", path.display(), e)))?;
    let mut written = 0usize;
    while let Some(chunk) = res
        .chunk()
        .await
        .map_err(|e| DomainError::Remote(format!("read body of {}: {}", url, e)))?
    {
        f.write_all(&chunk)
            .await
            .map_err(|e| DomainError::Image(format!("write {}: {}", path.display(), e)))?;
        written += chunk.len();
    }
    f.flush()
        .await
        .map_err(|e| DomainError::Image(format!("flush {}: {}", path.display(), e)))?;
    Ok(written)
}
