// Dataset orchestrator: roster fetch, per-league baseline fan-out, then a
// synchronous normalization pass over the roster.
//
// Only the roster fetch can fail a load. A league whose list cannot be
// fetched is logged and left out of the cache; its players get sentinel
// columns.

use std::collections::HashSet;

use bsmstats_core::config::SourceConfig;
use bsmstats_core::fetch::{FetchError, JsonFetcher};
use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{BaselineCache, CachedRoster, RosterCache};
use crate::dataset::DatasetKind;
use crate::normalize::DerivedPlayerRow;
use crate::record::{LeagueId, RawPlayerStat, StatsEnvelope};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to load {kind} data from {url}: {source}")]
    Fetch {
        kind: DatasetKind,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("malformed {kind} payload from {url}: {source}")]
    Decode {
        kind: DatasetKind,
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// What a baseline pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineReport {
    pub computed: Vec<LeagueId>,
    pub failed: Vec<LeagueId>,
}

/// Owns the transport and both session caches.
pub struct StatsEngine<F> {
    fetcher: F,
    base_url: String,
    club_id: u32,
    rosters: RosterCache,
    baselines: BaselineCache,
}

impl<F: JsonFetcher> StatsEngine<F> {
    pub fn new(fetcher: F, source: &SourceConfig) -> Self {
        Self {
            fetcher,
            base_url: source.base_url.clone(),
            club_id: source.club_id,
            rosters: RosterCache::new(),
            baselines: BaselineCache::new(),
        }
    }

    pub fn club_id(&self) -> u32 {
        self.club_id
    }

    pub fn baselines(&self) -> &BaselineCache {
        &self.baselines
    }

    pub fn rosters(&self) -> &RosterCache {
        &self.rosters
    }

    /// Forget every cached roster and baseline.
    pub fn clear_cache(&mut self) {
        self.rosters.clear();
        self.baselines.clear();
    }

    /// Fetch (or reuse) the club roster, make sure every league it references
    /// has a baseline, and derive one row per roster entry in roster order.
    pub async fn load_and_derive(
        &mut self,
        kind: DatasetKind,
    ) -> Result<Vec<DerivedPlayerRow>, DatasetError> {
        let roster = self.load_roster(kind).await?;
        let report = self.ensure_baselines(kind, &roster.rows).await;
        if !report.failed.is_empty() {
            warn!(
                %kind,
                failed = report.failed.len(),
                "some league baselines are unavailable; their players get no derived stats"
            );
        }
        Ok(derive_rows(kind, &roster.rows, &self.baselines))
    }

    /// Derive rows from cached data only; `None` before the first load.
    pub fn derive_cached(&self, kind: DatasetKind) -> Option<Vec<DerivedPlayerRow>> {
        let roster = self.rosters.get(kind)?;
        Some(derive_rows(kind, &roster.rows, &self.baselines))
    }

    /// The club roster for `kind`, fetched once per session.
    pub async fn load_roster(&mut self, kind: DatasetKind) -> Result<CachedRoster, DatasetError> {
        if let Some(cached) = self.rosters.get(kind) {
            debug!(%kind, fetched_at = %cached.fetched_at, "using cached roster");
            return Ok(cached.clone());
        }

        let url = kind.club_url(&self.base_url, self.club_id);
        let envelope = fetch_envelope(&self.fetcher, kind, &url).await?;
        info!(%kind, club = self.club_id, rows = envelope.data.len(), "roster loaded");
        Ok(self.rosters.insert(kind, envelope.data))
    }

    /// Compute baselines for every league in `rows` that is not cached yet.
    /// League fetches run concurrently; results are committed once all of
    /// them have finished.
    pub async fn ensure_baselines(
        &mut self,
        kind: DatasetKind,
        rows: &[RawPlayerStat],
    ) -> BaselineReport {
        let pending = uncached_leagues(kind, rows, &self.baselines);
        let mut report = BaselineReport::default();
        if pending.is_empty() {
            return report;
        }

        let config = kind.config();
        let fetcher = &self.fetcher;
        let base_url = self.base_url.as_str();
        let outcomes = join_all(pending.into_iter().map(|league| async move {
            let url = kind.league_url(base_url, &league);
            let outcome = fetch_envelope(fetcher, kind, &url)
                .await
                .map(|envelope| config.aggregate(&envelope.data));
            (league, outcome)
        }))
        .await;

        for (league, outcome) in outcomes {
            match outcome {
                Ok(baseline) => {
                    debug!(%kind, %league, ?baseline, "league baseline computed");
                    self.baselines.insert(kind, league.clone(), baseline);
                    report.computed.push(league);
                }
                Err(e) => {
                    warn!(%kind, %league, "league baseline skipped: {e}");
                    report.failed.push(league);
                }
            }
        }

        info!(
            %kind,
            computed = report.computed.len(),
            failed = report.failed.len(),
            "league baselines updated"
        );
        report
    }
}

/// Distinct league ids referenced by `rows`, in first-seen order, that have
/// no cached baseline for `kind`.
pub fn uncached_leagues(
    kind: DatasetKind,
    rows: &[RawPlayerStat],
    cache: &BaselineCache,
) -> Vec<LeagueId> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(RawPlayerStat::league_id)
        .filter(|id| !cache.contains(kind, id))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Map every roster row through the normalizer. Rows whose league has no
/// cached baseline use the all-zero baseline.
pub fn derive_rows(
    kind: DatasetKind,
    rows: &[RawPlayerStat],
    baselines: &BaselineCache,
) -> Vec<DerivedPlayerRow> {
    let config = kind.config();
    let empty = config.empty_baseline();
    rows.iter()
        .map(|row| {
            let baseline = row
                .league_id()
                .and_then(|id| baselines.get(kind, &id))
                .unwrap_or(&empty);
            config.map_row(row, baseline)
        })
        .collect()
}

async fn fetch_envelope<F: JsonFetcher + ?Sized>(
    fetcher: &F,
    kind: DatasetKind,
    url: &str,
) -> Result<StatsEnvelope, DatasetError> {
    let json = fetcher
        .fetch_json(url)
        .await
        .map_err(|source| DatasetError::Fetch {
            kind,
            url: url.to_string(),
            source,
        })?;
    StatsEnvelope::from_json(json).map_err(|source| DatasetError::Decode {
        kind,
        url: url.to_string(),
        source,
    })
}
