use thiserror::Error;

use crate::api::{Player, ScoreApi};

/// User-facing failures. All of these are transient: the next successful
/// operation overwrites or clears them, and the previously fetched roster
/// stays on screen throughout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to fetch match data, make sure the scoring service is running")]
    FetchFailed,
    #[error("failed to increment score for {0}")]
    IncrementFailed(String),
    #[error("failed to reset scores")]
    ResetFailed,
    #[error("match already has a winner, reset to start a new match")]
    MatchDecided,
}

/// Single source of truth for the displayed roster. The roster is only ever
/// replaced wholesale with a snapshot returned by the scoring service; no
/// intent patches individual players locally.
#[derive(Debug, Default)]
pub struct MatchStore {
    players: Vec<Player>,
    loading: bool,
    error: Option<StoreError>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }

    pub fn winner(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.winner)
    }

    /// Fetches the full roster. On failure the previous roster stays visible.
    /// `loading` is cleared on both paths, so it cannot stay stuck after a
    /// failed round trip.
    pub fn refresh(&mut self, api: &dyn ScoreApi) {
        self.loading = true;
        let fetched = api.list_players();
        self.loading = false;
        match fetched {
            Ok(roster) => {
                self.players = roster;
                self.error = None;
            }
            Err(_) => self.error = Some(StoreError::FetchFailed),
        }
    }

    /// Adds a point for `name`, then refetches the roster instead of applying
    /// the increment locally. Rejected without a network call when the current
    /// snapshot already holds a winner; the server enforces the same rule and
    /// stays authoritative.
    pub fn increment_score(&mut self, api: &dyn ScoreApi, name: &str) {
        if self.winner().is_some() {
            self.error = Some(StoreError::MatchDecided);
            return;
        }
        let outcome = api.increment_score(name).and_then(|_| api.list_players());
        match outcome {
            Ok(roster) => {
                self.players = roster;
                self.error = None;
            }
            Err(_) => self.error = Some(StoreError::IncrementFailed(name.to_string())),
        }
    }

    /// Resets all scores. The reset endpoint returns the zeroed roster
    /// directly, so no follow-up fetch is needed.
    pub fn reset(&mut self, api: &dyn ScoreApi) {
        match api.reset_match() {
            Ok(roster) => {
                self.players = roster;
                self.error = None;
            }
            Err(_) => self.error = Some(StoreError::ResetFailed),
        }
    }
}
