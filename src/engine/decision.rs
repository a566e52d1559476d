//! Decision tiering.
//!
//! Maps a line evaluation plus matchup context onto a discrete confidence
//! tier. The ladder is checked strictest-first and the first rung whose
//! hit-rate and cushion thresholds are both cleared wins; downgrade rules
//! then pull the raw tier back down when the surrounding evidence says the
//! number is less trustworthy than it looks:
//! - risk-listed teams are never bet, whatever the numbers say;
//! - non-exact team data caps the tier below Safe, because a 99% hit rate
//!   computed on a defaulted profile is not a 99% hit rate;
//! - an elite defense turns a borderline Safe into a Lean.
//!
//! Everything here is pure: thresholds and risk lists come in through
//! [`DecisionConfig`] at construction, never from globals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DecisionConfig;
use crate::engine::evaluator::BetDirection;
use crate::profiles::MatchQuality;

/// Confidence tier, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Lock,
    Safe,
    Lean,
    /// Caution class for tracking only; never an actionable pick.
    Maybe,
    NoBet,
}

impl Tier {
    /// Strictness rank; higher is stronger. Used by monotonicity checks.
    pub fn rank(self) -> u8 {
        match self {
            Tier::Lock => 4,
            Tier::Safe => 3,
            Tier::Lean => 2,
            Tier::Maybe => 1,
            Tier::NoBet => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Lock => "LOCK",
            Tier::Safe => "SAFE",
            Tier::Lean => "LEAN",
            Tier::Maybe => "MAYBE",
            Tier::NoBet => "NO BET",
        }
    }

    fn one_below(self) -> Tier {
        match self {
            Tier::Lock => Tier::Safe,
            Tier::Safe => Tier::Lean,
            Tier::Lean => Tier::Maybe,
            Tier::Maybe | Tier::NoBet => Tier::NoBet,
        }
    }
}

/// Everything the classifier needs about one evaluated game.
#[derive(Debug, Clone)]
pub struct ClassifierInput<'a> {
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub direction: BetDirection,
    pub hit_rate: f64,
    pub cushion: f64,
    pub home_quality: MatchQuality,
    pub away_quality: MatchQuality,
    pub elite_defense: bool,
}

/// Classification outcome: the tier, its suggested bankroll fraction, and
/// the reasons behind every adjustment made along the way.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub tier: Tier,
    pub label: String,
    pub stake_fraction: f64,
    pub reasons: Vec<String>,
}

/// Pure tier classifier over a [`DecisionConfig`].
#[derive(Debug, Clone)]
pub struct DecisionClassifier {
    config: DecisionConfig,
}

impl DecisionClassifier {
    pub fn new(config: DecisionConfig) -> Self {
        DecisionClassifier { config }
    }

    pub fn classify(&self, input: &ClassifierInput<'_>) -> Decision {
        let cfg = &self.config;
        let mut reasons = Vec::new();

        if let Some(team) = self.risk_listed(input) {
            reasons.push(format!("{team} is risk-listed, forcing NO BET"));
            return self.finish(Tier::NoBet, reasons);
        }

        let mut tier = self.raw_tier(input.hit_rate, input.cushion);
        reasons.push(format!(
            "{:.1}% hit rate, {:+.1} cushion -> raw {}",
            input.hit_rate,
            input.cushion,
            tier.label()
        ));

        // High confidence computed on unverified data is untrustworthy:
        // cap below Safe whenever either side is not an exact match.
        let worst_quality = input.home_quality.max(input.away_quality);
        if worst_quality != MatchQuality::Exact && tier.rank() > Tier::Lean.rank() {
            tier = Tier::Lean;
            reasons.push(format!(
                "capped at {} ({:?} team data)",
                tier.label(),
                worst_quality
            ));
        }

        if input.elite_defense
            && tier == Tier::Safe
            && input.hit_rate < cfg.elite_defense_hit_floor
        {
            tier = tier.one_below();
            reasons.push(format!(
                "elite defense in matchup, borderline hit rate: downgraded to {}",
                tier.label()
            ));
        }

        if input.hit_rate >= cfg.outlier_hit_rate {
            reasons.push(format!(
                "{:.1}% hit rate is an outlier, verify the matchup manually",
                input.hit_rate
            ));
        }

        debug!(
            home = input.home_team,
            away = input.away_team,
            tier = tier.label(),
            "classified"
        );
        self.finish(tier, reasons)
    }

    fn raw_tier(&self, hit_rate: f64, cushion: f64) -> Tier {
        let ladder = &self.config.ladder;
        let rungs = [
            (Tier::Lock, ladder.lock),
            (Tier::Safe, ladder.safe),
            (Tier::Lean, ladder.lean),
        ];
        for (tier, threshold) in rungs {
            if hit_rate >= threshold.min_hit_rate && cushion >= threshold.min_cushion {
                return tier;
            }
        }
        if hit_rate >= self.config.maybe_min_hit_rate {
            Tier::Maybe
        } else {
            Tier::NoBet
        }
    }

    fn risk_listed(&self, input: &ClassifierInput<'_>) -> Option<String> {
        let home = input.home_team.to_lowercase();
        let away = input.away_team.to_lowercase();
        for entry in &self.config.blacklist {
            if home.contains(entry) {
                return Some(input.home_team.to_string());
            }
            if away.contains(entry) {
                return Some(input.away_team.to_string());
            }
        }
        // Blowout risk breaks unders: a weak road team getting run off the
        // floor sends the total over any maximum.
        if input.direction == BetDirection::Under {
            for entry in &self.config.blowout_risk {
                if away.contains(entry) {
                    return Some(input.away_team.to_string());
                }
            }
        }
        None
    }

    fn finish(&self, tier: Tier, reasons: Vec<String>) -> Decision {
        let cfg = &self.config;
        let stake_fraction = match tier {
            Tier::Lock => cfg.stake_lock,
            Tier::Safe => cfg.stake_safe,
            Tier::Lean => cfg.stake_lean,
            Tier::Maybe | Tier::NoBet => 0.0,
        };
        Decision {
            tier,
            label: tier.label().to_string(),
            stake_fraction,
            reasons,
        }
    }
}
