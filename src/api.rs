use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// One side of the match as the scoring service reports it. The client never
/// edits these fields directly; every change goes through a `ScoreApi` intent
/// and comes back as a fresh roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub current_set_games: u32,
    #[serde(default)]
    pub sets: Vec<u32>,
    #[serde(default)]
    pub tiebreak: bool,
    #[serde(default)]
    pub tiebreak_points: u32,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub winner: bool,
}

/// The remote scoring service, consumed as an interface so the store can be
/// exercised against a test double.
pub trait ScoreApi {
    fn list_players(&self) -> Result<Vec<Player>>;

    /// Adds a point for `name`. The service answers with a single-player
    /// payload that the client discards; callers refetch the full roster
    /// instead of patching local state.
    fn increment_score(&self, name: &str) -> Result<()>;

    /// Resets the whole match. Unlike increment, the reset endpoint returns
    /// the zeroed roster directly, so no follow-up fetch is needed.
    fn reset_match(&self) -> Result<Vec<Player>>;
}

pub struct HttpScoreApi {
    base_url: String,
}

impl HttpScoreApi {
    /// Reads `TENNIS_API_URL` once; the base address is fixed for the life of
    /// the process.
    pub fn from_env() -> Self {
        let base_url = env::var("TENNIS_API_URL")
            .ok()
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}{path}", self.base_url);
        let resp = client
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("error status from {url}"))?;
        resp.text().context("failed to read response body")
    }

    fn post_text(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}{path}", self.base_url);
        let resp = client
            .post(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("error status from {url}"))?;
        resp.text().context("failed to read response body")
    }
}

impl ScoreApi for HttpScoreApi {
    fn list_players(&self) -> Result<Vec<Player>> {
        let body = self.get_text("/players")?;
        parse_players_json(&body)
    }

    fn increment_score(&self, name: &str) -> Result<()> {
        self.post_text(&format!("/players/{name}/increment"))?;
        Ok(())
    }

    fn reset_match(&self) -> Result<Vec<Player>> {
        let body = self.post_text("/players/reset")?;
        parse_players_json(&body)
    }
}

pub fn parse_players_json(raw: &str) -> Result<Vec<Player>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid players json")
}
