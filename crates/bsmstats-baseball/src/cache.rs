// Session caches: raw rosters per dataset and baselines per league.
//
// Neither cache evicts. Baselines are deterministic for a session's data, so
// `clear` exists only to start over (tests, forced reloads).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::baseline::LeagueBaseline;
use crate::dataset::DatasetKind;
use crate::record::{LeagueId, RawPlayerStat};

#[derive(Debug, Default)]
pub struct BaselineCache {
    entries: HashMap<(DatasetKind, LeagueId), LeagueBaseline>,
}

impl BaselineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DatasetKind, league: &LeagueId) -> Option<&LeagueBaseline> {
        self.entries.get(&(kind, league.clone()))
    }

    pub fn contains(&self, kind: DatasetKind, league: &LeagueId) -> bool {
        self.entries.contains_key(&(kind, league.clone()))
    }

    pub fn insert(&mut self, kind: DatasetKind, league: LeagueId, baseline: LeagueBaseline) {
        self.entries.insert((kind, league), baseline);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A roster as fetched, shared cheaply with every derivation pass.
#[derive(Debug, Clone)]
pub struct CachedRoster {
    pub rows: Arc<Vec<RawPlayerStat>>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RosterCache {
    entries: HashMap<DatasetKind, CachedRoster>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&CachedRoster> {
        self.entries.get(&kind)
    }

    /// Store a freshly fetched roster and return the cached entry.
    pub fn insert(&mut self, kind: DatasetKind, rows: Vec<RawPlayerStat>) -> CachedRoster {
        let entry = CachedRoster {
            rows: Arc::new(rows),
            fetched_at: Utc::now(),
        };
        self.entries.insert(kind, entry.clone());
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
