// Rate-stat formulas over coerced counting stats.
//
// The feed carries no hit-by-pitch or sacrifice-fly counts for batters, so
// plate appearances are approximated as AB + BB and wOBA uses the same
// denominator. The linear weights are fixed, not run-environment adjusted.

use crate::coerce::innings_value;
use crate::record::StatValues;

/// Linear weights for the simplified wOBA numerator.
pub const WOBA_BB: f64 = 0.69;
pub const WOBA_1B: f64 = 0.89;
pub const WOBA_2B: f64 = 1.27;
pub const WOBA_3B: f64 = 1.62;
pub const WOBA_HR: f64 = 2.10;

/// FIP component weights.
pub const FIP_HR: f64 = 13.0;
pub const FIP_BB_HBP: f64 = 3.0;
pub const FIP_K: f64 = 2.0;

// ---------------------------------------------------------------------------
// Batting
// ---------------------------------------------------------------------------

/// A batter's counting stats with every field coerced (missing = 0).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BattingCounts {
    pub games: f64,
    pub at_bats: f64,
    pub runs: f64,
    pub rbi: f64,
    pub hits: f64,
    pub doubles: f64,
    pub triples: f64,
    pub homeruns: f64,
    pub walks: f64,
    pub strikeouts: f64,
}

impl BattingCounts {
    pub fn from_values(v: &StatValues) -> Self {
        Self {
            games: StatValues::count(&v.games),
            at_bats: StatValues::count(&v.at_bats),
            runs: StatValues::count(&v.runs),
            rbi: StatValues::count(&v.runs_batted_in),
            hits: StatValues::count(&v.hits),
            doubles: StatValues::count(&v.doubles),
            triples: StatValues::count(&v.triples),
            homeruns: StatValues::count(&v.homeruns),
            walks: StatValues::count(&v.base_on_balls),
            strikeouts: StatValues::count(&v.strikeouts),
        }
    }

    /// AB + BB.
    pub fn plate_appearances(&self) -> f64 {
        self.at_bats + self.walks
    }

    /// Hits that were not extra-base hits; never negative even when the
    /// feed reports more extra-base hits than hits.
    pub fn singles(&self) -> f64 {
        (self.hits - self.doubles - self.triples - self.homeruns).max(0.0)
    }

    /// Weighted sum of walks and hit types, before dividing by AB + BB.
    pub fn woba_numerator(&self) -> f64 {
        WOBA_BB * self.walks
            + WOBA_1B * self.singles()
            + WOBA_2B * self.doubles
            + WOBA_3B * self.triples
            + WOBA_HR * self.homeruns
    }

    /// Simplified wOBA; exactly 0 when there is no denominator.
    pub fn simplified_woba(&self) -> f64 {
        let denom = self.at_bats + self.walks;
        if denom <= 0.0 {
            return 0.0;
        }
        self.woba_numerator() / denom
    }
}

/// OPS from the feed: the precomputed field when it parses, otherwise
/// OBP + SLG (a missing half counts as 0). NaN when none of the three
/// fields is usable.
pub fn on_base_plus_slugging(v: &StatValues) -> f64 {
    if let Some(ops) = v.on_base_plus_slugging.as_finite() {
        return ops;
    }
    let obp = v.on_base_percentage.as_finite();
    let slg = v.slugging_percentage.as_finite();
    if obp.is_none() && slg.is_none() {
        return f64::NAN;
    }
    obp.unwrap_or(0.0) + slg.unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Pitching
// ---------------------------------------------------------------------------

/// Pitching totals for one pitcher or a whole league.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchingTotals {
    pub innings: f64,
    pub earned_runs: f64,
    pub runs: f64,
    pub homeruns: f64,
    pub walks: f64,
    pub hit_by_pitch: f64,
    pub strikeouts: f64,
}

impl PitchingTotals {
    pub fn from_values(v: &StatValues) -> Self {
        Self {
            innings: innings_value(&v.innings_pitched),
            earned_runs: StatValues::count(&v.earned_runs),
            runs: StatValues::count(&v.runs),
            homeruns: StatValues::count(&v.homeruns),
            walks: StatValues::count(&v.base_on_balls_allowed),
            hit_by_pitch: StatValues::count(&v.hit_by_pitches),
            strikeouts: StatValues::count(&v.strikeouts),
        }
    }

    pub fn add(&mut self, other: &PitchingTotals) {
        self.innings += other.innings;
        self.earned_runs += other.earned_runs;
        self.runs += other.runs;
        self.homeruns += other.homeruns;
        self.walks += other.walks;
        self.hit_by_pitch += other.hit_by_pitch;
        self.strikeouts += other.strikeouts;
    }

    /// ER * 9 / IP, or `None` without innings.
    pub fn era(&self) -> Option<f64> {
        per_nine(self.earned_runs, self.innings)
    }

    /// R * 9 / IP, or `None` without innings.
    pub fn ra9(&self) -> Option<f64> {
        per_nine(self.runs, self.innings)
    }

    /// `(13*HR + 3*(BB+HBP) - 2*K) / IP` before the league constant is added.
    pub fn fip_raw(&self) -> Option<f64> {
        if self.innings <= 0.0 {
            return None;
        }
        let numerator = FIP_HR * self.homeruns + FIP_BB_HBP * (self.walks + self.hit_by_pitch)
            - FIP_K * self.strikeouts;
        Some(numerator / self.innings)
    }
}

fn per_nine(count: f64, innings: f64) -> Option<f64> {
    (innings > 0.0).then(|| count * 9.0 / innings)
}
