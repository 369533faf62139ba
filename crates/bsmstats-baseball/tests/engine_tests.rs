// Integration tests for the statistics engine.
//
// A scripted in-memory fetcher stands in for the feed so the tests can
// count requests per URL and flip endpoints between failing and working.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bsmstats_baseball::{DatasetError, DatasetKind, LeagueId, StatsEngine};
use bsmstats_core::config::SourceConfig;
use bsmstats_core::fetch::{FetchError, JsonFetcher};
use serde_json::{json, Value};

// ===========================================================================
// Test helpers
// ===========================================================================

const BASE: &str = "https://bsm.test";
const CLUB: u32 = 492;

#[derive(Default)]
struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn respond(&self, url: impl Into<String>, body: Value) {
        self.responses.lock().unwrap().insert(url.into(), body);
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl JsonFetcher for ScriptedFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn source() -> SourceConfig {
    SourceConfig {
        base_url: BASE.into(),
        club_id: CLUB,
    }
}

fn roster_url(kind: DatasetKind) -> String {
    kind.club_url(BASE, CLUB)
}

fn league_url(kind: DatasetKind, id: &str) -> String {
    kind.league_url(BASE, &LeagueId::new(id))
}

fn engine() -> (Arc<ScriptedFetcher>, StatsEngine<Arc<ScriptedFetcher>>) {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let engine = StatsEngine::new(Arc::clone(&fetcher), &source());
    (fetcher, engine)
}

/// League 10: 200 PA, league OPS .700, 0.1 runs per PA.
fn batting_league_10() -> Value {
    json!({ "data": [
        { "values": { "at_bats": 90, "base_on_balls": 10, "hits": 30, "runs": 12,
                      "on_base_plus_slugging": ".800" } },
        { "values": { "at_bats": 90, "base_on_balls": 10, "hits": 20, "runs": 8,
                      "on_base_plus_slugging": ".600" } }
    ]})
}

fn batting_roster() -> Value {
    json!({ "data": [
        { "person": { "first_name": "Anna", "last_name": "Beck" },
          "league": { "id": 10, "acronym": "BLN", "season": 2024 },
          "values": { "at_bats": 90, "base_on_balls": 10, "hits": 30, "runs": 12,
                      "on_base_plus_slugging": ".800" } },
        { "person": { "first_name": "Ben", "last_name": "Cole" },
          "league": { "id": 20, "acronym": "VL", "season": 2024 },
          "values": { "at_bats": 40, "hits": 10, "on_base_plus_slugging": ".650" } },
        { "person": { "first_name": "Cem", "last_name": "Dag" },
          "values": { "at_bats": 5, "hits": 1 } }
    ]})
}

/// League 30: 18 IP, league ERA 3.00, R/9 4.50.
fn pitching_league_30() -> Value {
    json!({ "data": [
        { "values": { "innings_pitched": "9.0", "earned_runs": 4, "runs": 5, "homeruns": 1,
                      "base_on_balls_allowed": 3, "hit_by_pitches": 0, "strikeouts": 6 } },
        { "values": { "innings_pitched": "9", "earned_runs": 2, "runs": 4, "homeruns": 0,
                      "base_on_balls_allowed": 2, "hit_by_pitches": 1, "strikeouts": 12 } }
    ]})
}

fn pitching_roster() -> Value {
    json!({ "data": [
        { "person": { "first_name": "Pia", "last_name": "Roth" },
          "league": { "id": 30, "acronym": "BLN", "season": 2023,
                      "game_class": { "season": 2024 } },
          "values": { "innings_pitched": "9.0", "earned_runs": 3, "homeruns": 1,
                      "base_on_balls_allowed": 3, "hit_by_pitches": 0, "strikeouts": 9 } },
        { "person": { "first_name": "Tom", "last_name": "Uhl" },
          "league": { "id": 30, "acronym": "BLN", "season": 2024 },
          "values": { "innings_pitched": "0.0", "earned_runs": 2, "runs": 2 } }
    ]})
}

fn names(rows: &[bsmstats_baseball::DerivedPlayerRow]) -> Vec<String> {
    rows.iter().map(|r| r.display("Name")).collect()
}

// ===========================================================================
// Batting
// ===========================================================================

#[tokio::test]
async fn batting_rows_are_derived_against_their_league() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Batting), batting_roster());
    fetcher.respond(league_url(DatasetKind::Batting, "10"), batting_league_10());

    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(names(&rows), ["Anna Beck", "Ben Cole", "Cem Dag"]);

    let anna = &rows[0];
    assert_eq!(anna.display("OPS"), "0.800");
    assert_eq!(anna.display("OPS+"), "114");
    assert_eq!(anna.display("wRC+"), "115");
    assert_eq!(anna.display("WAR"), "-0.19");

    // League 20 could not be fetched.
    let ben = &rows[1];
    assert_eq!(ben.display("OPS"), "0.650");
    for col in ["OPS+", "wRC+", "WAR"] {
        assert_eq!(ben.display(col), "-", "column {col}");
    }

    // No league at all: nothing fetched for it, sentinels only.
    assert_eq!(rows[2].display("wRC+"), "-");
    assert_eq!(rows[2].display("League"), "-");

    assert_eq!(fetcher.total_calls(), 3);
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Batting, "20")), 1);
}

#[tokio::test]
async fn reload_uses_cached_roster_and_baselines() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Batting), batting_roster());
    fetcher.respond(league_url(DatasetKind::Batting, "10"), batting_league_10());

    let first = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    let second = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(fetcher.calls_to(&roster_url(DatasetKind::Batting)), 1);
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Batting, "10")), 1);
    // Failed leagues are not cached and get retried.
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Batting, "20")), 2);
    assert_eq!(engine.baselines().len(), 1);
}

#[tokio::test]
async fn failed_league_recovers_on_next_load() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Batting), batting_roster());
    fetcher.respond(league_url(DatasetKind::Batting, "10"), batting_league_10());

    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(rows[1].display("OPS+"), "-");

    fetcher.respond(league_url(DatasetKind::Batting, "20"), batting_league_10());
    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_ne!(rows[1].display("OPS+"), "-");
    assert!(engine
        .baselines()
        .contains(DatasetKind::Batting, &LeagueId::new("20")));
}

#[tokio::test]
async fn shared_leagues_are_fetched_once() {
    let (fetcher, mut engine) = engine();
    let players: Vec<Value> = (0..6)
        .map(|i| {
            json!({
                "person": { "first_name": format!("P{i}") },
                "league": { "id": if i % 2 == 0 { json!(10) } else { json!("11") } },
                "values": { "at_bats": 10 + i, "hits": i }
            })
        })
        .collect();
    fetcher.respond(roster_url(DatasetKind::Batting), json!({ "data": players }));
    fetcher.respond(league_url(DatasetKind::Batting, "10"), batting_league_10());
    fetcher.respond(league_url(DatasetKind::Batting, "11"), batting_league_10());

    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(names(&rows), ["P0", "P1", "P2", "P3", "P4", "P5"]);
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Batting, "10")), 1);
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Batting, "11")), 1);
    assert_eq!(fetcher.total_calls(), 3);
}

// ===========================================================================
// Pitching
// ===========================================================================

#[tokio::test]
async fn pitching_rows_use_fip_baseline() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Pitching), pitching_roster());
    fetcher.respond(league_url(DatasetKind::Pitching, "30"), pitching_league_30());

    let rows = engine.load_and_derive(DatasetKind::Pitching).await.unwrap();
    assert_eq!(names(&rows), ["Pia Roth", "Tom Uhl"]);

    let pia = &rows[0];
    assert_eq!(pia.display("Season"), "2024");
    assert_eq!(pia.display("ERA"), "3.00");
    assert_eq!(pia.display("FIP"), "3.72");
    assert_eq!(pia.display("ERA+"), "100");
    assert_eq!(pia.display("WAR"), "0.17");

    let tom = &rows[1];
    assert_eq!(tom.display("IP"), "0.0");
    for col in ["ERA", "FIP", "ERA+", "WAR"] {
        assert_eq!(tom.display(col), "-", "column {col}");
    }

    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Pitching, "30")), 1);
}

#[tokio::test]
async fn batting_and_pitching_baselines_are_separate() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(
        roster_url(DatasetKind::Batting),
        json!({ "data": [{ "league": { "id": 30 }, "values": { "at_bats": 4 } }] }),
    );
    fetcher.respond(roster_url(DatasetKind::Pitching), pitching_roster());
    fetcher.respond(league_url(DatasetKind::Batting, "30"), batting_league_10());
    fetcher.respond(league_url(DatasetKind::Pitching, "30"), pitching_league_30());

    engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    engine.load_and_derive(DatasetKind::Pitching).await.unwrap();

    let id = LeagueId::new("30");
    assert!(engine.baselines().contains(DatasetKind::Batting, &id));
    assert!(engine.baselines().contains(DatasetKind::Pitching, &id));
    assert_eq!(engine.baselines().len(), 2);
}

// ===========================================================================
// Failures and cache control
// ===========================================================================

#[tokio::test]
async fn roster_failure_is_an_error_and_not_cached() {
    let (fetcher, mut engine) = engine();

    let err = engine.load_and_derive(DatasetKind::Batting).await.unwrap_err();
    assert!(matches!(
        err,
        DatasetError::Fetch { kind: DatasetKind::Batting, .. }
    ));
    assert!(engine.rosters().get(DatasetKind::Batting).is_none());
    assert!(engine.derive_cached(DatasetKind::Batting).is_none());

    fetcher.respond(roster_url(DatasetKind::Batting), batting_roster());
    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(fetcher.calls_to(&roster_url(DatasetKind::Batting)), 2);
}

#[tokio::test]
async fn malformed_roster_is_a_decode_error() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Pitching), json!({ "data": "nope" }));

    let err = engine.load_and_derive(DatasetKind::Pitching).await.unwrap_err();
    assert!(matches!(err, DatasetError::Decode { .. }));
    assert!(err.to_string().contains("pitching"));
}

#[tokio::test]
async fn malformed_records_do_not_sink_the_load() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(
        roster_url(DatasetKind::Batting),
        json!({ "data": [
            { "person": { "first_name": "Anna", "last_name": "Beck" },
              "league": { "id": 10, "game_class": "A" },
              "values": { "at_bats": 90, "base_on_balls": 10, "hits": 30, "runs": 12,
                          "on_base_plus_slugging": ".800" } },
            { "person": { "first_name": "Odd" }, "league": { "id": 10 }, "values": "n/a" },
            42
        ]}),
    );
    let mut league = batting_league_10();
    if let Some(data) = league["data"].as_array_mut() {
        data.push(json!({ "values": "n/a" }));
        data.push(json!("junk"));
    }
    fetcher.respond(league_url(DatasetKind::Batting, "10"), league);

    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert_eq!(names(&rows), ["Anna Beck", "Odd"]);
    assert_eq!(rows[0].display("OPS+"), "114");
    assert_eq!(rows[0].display("wRC+"), "115");
    assert_eq!(rows[1].display("AB"), "0");
    assert!(engine
        .baselines()
        .contains(DatasetKind::Batting, &LeagueId::new("10")));
}

#[tokio::test]
async fn empty_roster_derives_nothing() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Batting), json!({}));

    let rows = engine.load_and_derive(DatasetKind::Batting).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(fetcher.total_calls(), 1);
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let (fetcher, mut engine) = engine();
    fetcher.respond(roster_url(DatasetKind::Pitching), pitching_roster());
    fetcher.respond(league_url(DatasetKind::Pitching, "30"), pitching_league_30());

    engine.load_and_derive(DatasetKind::Pitching).await.unwrap();
    assert!(engine.derive_cached(DatasetKind::Pitching).is_some());

    engine.clear_cache();
    assert!(engine.baselines().is_empty());
    assert!(engine.derive_cached(DatasetKind::Pitching).is_none());

    engine.load_and_derive(DatasetKind::Pitching).await.unwrap();
    assert_eq!(fetcher.calls_to(&roster_url(DatasetKind::Pitching)), 2);
    assert_eq!(fetcher.calls_to(&league_url(DatasetKind::Pitching, "30")), 2);
}
