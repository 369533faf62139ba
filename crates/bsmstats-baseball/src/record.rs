// Feed record model: one player's season line for one league.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::coerce::{coerce_number, LooseValue};

/// Nested sections: anything other than a well-formed object (null, a
/// string, a number, ...) reads as the default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => T::deserialize(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// Player list: `null` or a missing key is empty, and elements that are not
/// objects are dropped. A `data` value that is not a list is still an error.
fn player_rows<'de, D>(deserializer: D) -> Result<Vec<RawPlayerStat>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = items.len();
    let rows: Vec<RawPlayerStat> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| RawPlayerStat::deserialize(item).ok())
        .collect();
    if rows.len() < total {
        warn!(skipped = total - rows.len(), "skipped malformed player records");
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Top-level payload of every statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default, deserialize_with = "player_rows")]
    pub data: Vec<RawPlayerStat>,
}

impl StatsEnvelope {
    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }
}

// ---------------------------------------------------------------------------
// Player record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayerStat {
    #[serde(default, deserialize_with = "lenient")]
    pub person: Person,
    #[serde(default, deserialize_with = "lenient")]
    pub league: LeagueRef,
    #[serde(default, deserialize_with = "lenient")]
    pub values: StatValues,
}

impl RawPlayerStat {
    /// "First Last", trimmed; either half may be missing.
    pub fn display_name(&self) -> String {
        let first = self.person.first_name.as_display().unwrap_or_default();
        let last = self.person.last_name.as_display().unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    }

    pub fn league_id(&self) -> Option<LeagueId> {
        LeagueId::from_loose(&self.league.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Person {
    pub first_name: LooseValue,
    pub last_name: LooseValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeagueRef {
    pub id: LooseValue,
    pub name: LooseValue,
    pub acronym: LooseValue,
    pub season: LooseValue,
    pub human_age_group_short: LooseValue,
    #[serde(deserialize_with = "lenient")]
    pub game_class: Option<GameClass>,
}

/// Optional finer-grained classification that some league records carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameClass {
    pub season: LooseValue,
    pub human_age_group_short: LooseValue,
}

/// Every raw stat field the batting and pitching feeds supply.
///
/// Both feeds share `games`, `hits`, `runs`, `homeruns` and `strikeouts`;
/// in the pitching feed they count what the pitcher allowed or recorded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatValues {
    pub games: LooseValue,
    pub games_started: LooseValue,
    pub at_bats: LooseValue,
    pub runs: LooseValue,
    pub runs_batted_in: LooseValue,
    pub hits: LooseValue,
    pub doubles: LooseValue,
    pub triples: LooseValue,
    pub homeruns: LooseValue,
    pub base_on_balls: LooseValue,
    pub strikeouts: LooseValue,
    pub batting_average: LooseValue,
    pub on_base_percentage: LooseValue,
    pub slugging_percentage: LooseValue,
    pub on_base_plus_slugging: LooseValue,

    pub innings_pitched: LooseValue,
    pub batters_faced: LooseValue,
    pub earned_runs: LooseValue,
    pub base_on_balls_allowed: LooseValue,
    pub intentional_base_on_balls: LooseValue,
    pub hit_by_pitches: LooseValue,
    pub wild_pitches: LooseValue,
    pub balks: LooseValue,
    pub complete_games: LooseValue,
    pub wins: LooseValue,
    pub losses: LooseValue,
    pub saves: LooseValue,
    pub earned_runs_average: LooseValue,
    pub walks_and_hits_per_innings_pitched: LooseValue,
}

impl StatValues {
    /// Counting stat with the usual zero default.
    pub fn count(field: &LooseValue) -> f64 {
        coerce_number(field, 0.0)
    }
}

// ---------------------------------------------------------------------------
// League id
// ---------------------------------------------------------------------------

/// Cache key for a league. Numeric ids render without a decimal point so
/// `7` and `"7"` name the same league.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeagueId(String);

impl LeagueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `None` for absent ids, zero, and empty strings.
    pub fn from_loose(value: &LooseValue) -> Option<Self> {
        match value {
            LooseValue::Absent => None,
            LooseValue::Number(n) if !n.is_finite() || *n == 0.0 => None,
            LooseValue::Number(_) => value.as_display().map(Self),
            LooseValue::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| Self(s.to_string()))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
