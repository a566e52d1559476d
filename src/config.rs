//! Engine configuration.
//!
//! Every tuned constant in the pipeline lives here rather than in the code
//! that uses it: tempo weights, home-court split, shock probabilities, tier
//! thresholds, risk lists. Defaults carry the values backtested against the
//! 2024-25 season; deployments targeting another league or season construct
//! their own `EngineConfig` (all sub-configs are plain serde data).

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// League-wide baselines used for tempo regression and default profiles.
pub const LEAGUE_AVG_EFFICIENCY: f64 = 100.0;
pub const LEAGUE_AVG_TEMPO: f64 = 67.5;

/// Expected-score model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Weight of the home team's tempo in the game-tempo blend.
    pub tempo_weight_home: f64,
    /// Weight of the away team's tempo.
    pub tempo_weight_away: f64,
    /// Weight of the league-average tempo. Nonzero so extreme-tempo teams
    /// regress toward the mean when data is thin.
    pub tempo_weight_league: f64,
    /// Net home-court advantage in points.
    pub home_advantage: f64,
    /// Share of the advantage credited to the home offense; the remainder
    /// is debited from the away offense.
    pub home_offense_share: f64,
    /// Defensive efficiency below this is an elite defense.
    pub elite_defense_below: f64,
    /// Tempo below this counts as a slow game.
    pub slow_tempo_below: f64,
    /// Offensive efficiency below this is a weak offense.
    pub weak_offense_below: f64,
    /// Offensive efficiency below this is a mediocre offense.
    pub mediocre_offense_below: f64,
    /// Road defenses under this efficiency suppress mediocre home offenses.
    pub road_defense_below: f64,
    /// Home offenses under this are vulnerable to the road-defense squeeze.
    pub squeezable_offense_below: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            tempo_weight_home: 0.4,
            tempo_weight_away: 0.4,
            tempo_weight_league: 0.2,
            home_advantage: 3.5,
            home_offense_share: 0.6,
            elite_defense_below: 100.0,
            slow_tempo_below: 68.0,
            weak_offense_below: 105.0,
            mediocre_offense_below: 110.0,
            road_defense_below: 103.0,
            squeezable_offense_below: 113.0,
        }
    }
}

/// Rare-event adjustments layered on the normal score draws.
///
/// The probabilities are heuristics without a formal statistical
/// derivation; they exist to fat-tail the distribution toward observed
/// off-nights and grind-it-out games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShockConfig {
    /// Per-team probability of an off-night.
    pub bad_night_prob: f64,
    /// An off-night rescales the team's score into this fraction range of
    /// its expectation.
    pub bad_night_low: f64,
    pub bad_night_high: f64,
    /// Probability both teams get dragged into a defensive slugfest.
    pub slugfest_prob: f64,
    /// Combined points removed in a slugfest, split evenly.
    pub slugfest_low: f64,
    pub slugfest_high: f64,
    /// Per-team score floor; normal tails below this are not physical.
    pub score_floor: f64,
}

impl Default for ShockConfig {
    fn default() -> Self {
        ShockConfig {
            bad_night_prob: 0.05,
            bad_night_low: 0.70,
            bad_night_high: 0.85,
            slugfest_prob: 0.02,
            slugfest_low: 8.0,
            slugfest_high: 15.0,
            score_floor: 40.0,
        }
    }
}

/// Name-resolution parameters for the profile store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum normalized-Levenshtein similarity for a fuzzy match.
    pub fuzzy_threshold: f64,
    /// Games required before a team's empirical variance is trusted.
    pub min_games_for_variance: usize,
    /// Floor applied to every scoring standard deviation.
    pub std_dev_floor: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            fuzzy_threshold: 0.6,
            min_games_for_variance: 3,
            std_dev_floor: 8.0,
        }
    }
}

/// One rung of the tier ladder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierThreshold {
    pub min_hit_rate: f64,
    pub min_cushion: f64,
}

/// Qualified-tier thresholds, strictest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLadder {
    pub lock: TierThreshold,
    pub safe: TierThreshold,
    pub lean: TierThreshold,
}

impl Default for TierLadder {
    fn default() -> Self {
        TierLadder {
            lock: TierThreshold {
                min_hit_rate: 99.0,
                min_cushion: 35.0,
            },
            safe: TierThreshold {
                min_hit_rate: 99.0,
                min_cushion: 30.0,
            },
            lean: TierThreshold {
                min_hit_rate: 98.0,
                min_cushion: 25.0,
            },
        }
    }
}

/// Classification thresholds, downgrade rules, and risk lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub ladder: TierLadder,
    /// Unqualified games at or above this hit rate become Maybe
    /// (tracking-only caution class).
    pub maybe_min_hit_rate: f64,
    /// A Safe-tier game with an elite defense in the matchup drops a level
    /// unless its hit rate clears this bar.
    pub elite_defense_hit_floor: f64,
    /// Hit rates at or above this are flagged as suspicious outliers.
    pub outlier_hit_rate: f64,
    /// Lowercase substrings; a matchup containing any of them is never bet.
    /// High-variance programs whose game logs the model cannot trust.
    pub blacklist: Vec<String>,
    /// Lowercase substrings matched against the away team only; weak road
    /// teams that get blown out and break under bets.
    pub blowout_risk: Vec<String>,
    /// Suggested bankroll fractions per qualified tier.
    pub stake_lock: f64,
    pub stake_safe: f64,
    pub stake_lean: f64,
    /// Fractional Kelly multiplier applied when a market price is supplied.
    pub kelly_fraction: f64,
    /// Month/day (inclusive) through which the season counts as early.
    pub early_season_end_month: u32,
    pub early_season_end_day: u32,
    /// Proximity below this percentage raises the anomaly diagnostic.
    pub proximity_floor: f64,
    /// Band (points) around the standard line for the proximity check.
    pub proximity_band: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        DecisionConfig {
            ladder: TierLadder::default(),
            maybe_min_hit_rate: 80.0,
            elite_defense_hit_floor: 99.5,
            outlier_hit_rate: 99.5,
            blacklist: Vec::new(),
            blowout_risk: Vec::new(),
            stake_lock: 0.03,
            stake_safe: 0.02,
            stake_lean: 0.01,
            kelly_fraction: 0.25,
            early_season_end_month: 1,
            early_season_end_day: 15,
            proximity_floor: 70.0,
            proximity_band: 10.0,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub shocks: ShockConfig,
    pub matching: MatchConfig,
    pub decision: DecisionConfig,
    /// Simulations run when a request does not specify a count.
    pub default_simulations: u32,
    /// Requests below this count are rejected.
    pub min_simulations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            model: ModelConfig::default(),
            shocks: ShockConfig::default(),
            matching: MatchConfig::default(),
            decision: DecisionConfig::default(),
            default_simulations: 10_000,
            min_simulations: 1_000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let m = &self.model;
        let weight_sum = m.tempo_weight_home + m.tempo_weight_away + m.tempo_weight_league;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "tempo weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if m.tempo_weight_league <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "tempo_weight_league must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&m.home_offense_share) {
            return Err(EngineError::InvalidConfig(
                "home_offense_share must be between 0.0 and 1.0".into(),
            ));
        }
        let s = &self.shocks;
        if !(0.0..=1.0).contains(&s.bad_night_prob) || !(0.0..=1.0).contains(&s.slugfest_prob) {
            return Err(EngineError::InvalidConfig(
                "shock probabilities must be between 0.0 and 1.0".into(),
            ));
        }
        if s.bad_night_low > s.bad_night_high || s.slugfest_low > s.slugfest_high {
            return Err(EngineError::InvalidConfig(
                "shock ranges must be low <= high".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(EngineError::InvalidConfig(
                "fuzzy_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        let ladder = &self.decision.ladder;
        let rungs = [ladder.lock, ladder.safe, ladder.lean];
        for pair in rungs.windows(2) {
            if pair[0].min_hit_rate < pair[1].min_hit_rate
                || pair[0].min_cushion < pair[1].min_cushion
            {
                return Err(EngineError::InvalidConfig(
                    "tier ladder must be ordered strictest-first".into(),
                ));
            }
        }
        if self.decision.maybe_min_hit_rate > ladder.lean.min_hit_rate {
            return Err(EngineError::InvalidConfig(
                "maybe_min_hit_rate must not exceed the Lean hit-rate floor".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.decision.kelly_fraction) {
            return Err(EngineError::InvalidConfig(
                "kelly_fraction must be between 0.0 and 1.0".into(),
            ));
        }
        if self.min_simulations == 0 || self.default_simulations < self.min_simulations {
            return Err(EngineError::InvalidConfig(
                "default_simulations must be at least min_simulations (>= 1)".into(),
            ));
        }
        Ok(())
    }
}
