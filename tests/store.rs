use std::cell::{Cell, RefCell};

use anyhow::{Result, anyhow};
use tennis_terminal::api::{Player, ScoreApi};
use tennis_terminal::state::{MatchStore, StoreError};

fn player(name: &str) -> Player {
    Player {
        name: name.to_string(),
        points: 0,
        current_set_games: 0,
        sets: Vec::new(),
        tiebreak: false,
        tiebreak_points: 0,
        advantage: false,
        winner: false,
    }
}

fn fresh_roster() -> Vec<Player> {
    vec![player("Alcaraz"), player("Sinner")]
}

/// Scripted stand-in for the scoring service. Counts every call so tests can
/// assert which intents reached the network.
#[derive(Default)]
struct FakeApi {
    roster: RefCell<Vec<Player>>,
    fail_list: Cell<bool>,
    fail_increment: Cell<bool>,
    fail_reset: Cell<bool>,
    list_calls: Cell<u32>,
    increment_calls: Cell<u32>,
    reset_calls: Cell<u32>,
}

impl FakeApi {
    fn with_roster(roster: Vec<Player>) -> Self {
        Self {
            roster: RefCell::new(roster),
            ..Self::default()
        }
    }

    fn network_calls(&self) -> u32 {
        self.list_calls.get() + self.increment_calls.get() + self.reset_calls.get()
    }
}

impl ScoreApi for FakeApi {
    fn list_players(&self) -> Result<Vec<Player>> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_list.get() {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.roster.borrow().clone())
    }

    fn increment_score(&self, name: &str) -> Result<()> {
        self.increment_calls.set(self.increment_calls.get() + 1);
        if self.fail_increment.get() {
            return Err(anyhow!("connection refused"));
        }
        let mut roster = self.roster.borrow_mut();
        let target = roster
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| anyhow!("player not found"))?;
        target.points += 15;
        Ok(())
    }

    fn reset_match(&self) -> Result<Vec<Player>> {
        self.reset_calls.set(self.reset_calls.get() + 1);
        if self.fail_reset.get() {
            return Err(anyhow!("connection refused"));
        }
        let zeroed = fresh_roster();
        *self.roster.borrow_mut() = zeroed.clone();
        Ok(zeroed)
    }
}

#[test]
fn refresh_replaces_roster_and_clears_loading() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();

    store.refresh(&api);

    assert!(!store.loading());
    assert!(store.error().is_none());
    assert_eq!(store.players(), fresh_roster().as_slice());
}

#[test]
fn refresh_failure_keeps_previous_roster_visible() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();
    store.refresh(&api);

    api.fail_list.set(true);
    store.refresh(&api);

    assert!(!store.loading());
    assert_eq!(store.error(), Some(&StoreError::FetchFailed));
    assert_eq!(store.players(), fresh_roster().as_slice());
}

#[test]
fn increment_refetches_the_full_roster() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();
    store.refresh(&api);

    store.increment_score(&api, "Sinner");

    assert_eq!(api.increment_calls.get(), 1);
    // One list for the mount refresh, one for the post-increment refetch.
    assert_eq!(api.list_calls.get(), 2);
    assert!(store.error().is_none());
    assert_eq!(store.players(), api.roster.borrow().as_slice());
    assert_eq!(store.players()[1].points, 15);
    assert_eq!(store.players()[0].points, 0);
}

#[test]
fn increment_after_winner_is_rejected_without_a_network_call() {
    let mut roster = fresh_roster();
    roster[0].winner = true;
    let api = FakeApi::with_roster(roster);
    let mut store = MatchStore::new();
    store.refresh(&api);
    let calls_after_mount = api.network_calls();

    store.increment_score(&api, "Sinner");

    assert_eq!(api.network_calls(), calls_after_mount);
    assert_eq!(store.error(), Some(&StoreError::MatchDecided));
}

#[test]
fn increment_failure_names_the_player_and_keeps_the_roster() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();
    store.refresh(&api);

    api.fail_increment.set(true);
    store.increment_score(&api, "Alcaraz");

    assert_eq!(
        store.error(),
        Some(&StoreError::IncrementFailed("Alcaraz".to_string()))
    );
    assert!(store.error().unwrap().to_string().contains("Alcaraz"));
    assert_eq!(store.players(), fresh_roster().as_slice());
}

#[test]
fn reset_replaces_roster_with_the_returned_snapshot() {
    let mut roster = fresh_roster();
    roster[0].winner = true;
    roster[0].sets = vec![6, 6, 6];
    roster[0].points = 40;
    roster[1].sets = vec![2, 3, 1];
    let api = FakeApi::with_roster(roster);
    let mut store = MatchStore::new();
    store.refresh(&api);
    assert!(store.winner().is_some());

    store.reset(&api);

    assert_eq!(api.reset_calls.get(), 1);
    assert!(store.winner().is_none());
    assert!(store.error().is_none());
    for p in store.players() {
        assert!(!p.winner);
        assert_eq!(p.points, 0);
        assert_eq!(p.current_set_games, 0);
        assert!(p.sets.is_empty());
    }
}

#[test]
fn reset_failure_keeps_the_roster_visible() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();
    store.refresh(&api);

    api.fail_reset.set(true);
    store.reset(&api);

    assert_eq!(store.error(), Some(&StoreError::ResetFailed));
    assert_eq!(store.players(), fresh_roster().as_slice());
}

#[test]
fn next_successful_operation_clears_a_stale_error() {
    let api = FakeApi::with_roster(fresh_roster());
    let mut store = MatchStore::new();

    api.fail_list.set(true);
    store.refresh(&api);
    assert_eq!(store.error(), Some(&StoreError::FetchFailed));

    api.fail_list.set(false);
    store.refresh(&api);
    assert!(store.error().is_none());
}

#[test]
fn winner_guard_checks_the_current_snapshot_not_the_wire() {
    // The store has never fetched, so even a decided match on the service
    // side is not visible yet and the guard lets the intent through.
    let mut roster = fresh_roster();
    roster[1].winner = true;
    let api = FakeApi::with_roster(roster);
    let mut store = MatchStore::new();

    store.increment_score(&api, "Alcaraz");

    assert_eq!(api.increment_calls.get(), 1);
    assert!(store.winner().is_some());
}
