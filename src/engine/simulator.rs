//! Monte Carlo score simulator.
//!
//! Draws N final scores for a matchup. The base draw is a pair of normals
//! centered on the expected-score model, widened by each team's empirical
//! scoring variance. Two rare-event shocks fat-tail the distribution
//! beyond what normals capture:
//! - **Bad night** (per team): the offense never shows up and the team
//!   finishes at a fraction of its expectation.
//! - **Defensive slugfest** (per game): both teams grind, shaving a chunk
//!   of combined points.
//!
//! Each call owns its RNG. Passing a seed makes the draw sequence fully
//! reproducible; omitting it seeds from entropy, which is the production
//! mode.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::config::ShockConfig;
use crate::engine::matchup::Matchup;
use crate::error::EngineError;

/// Distribution summary of one simulation run.
///
/// `totals` holds exactly the requested number of draws; every summary
/// statistic is computed from that sequence with no resampling.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub totals: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: PercentileTable,
}

/// Fixed percentile cut of the simulated totals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PercentileTable {
    pub p1: f64,
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Stateless simulator over a [`ShockConfig`].
#[derive(Debug, Clone)]
pub struct ScoreSimulator {
    shocks: ShockConfig,
}

impl ScoreSimulator {
    pub fn new(shocks: ShockConfig) -> Self {
        ScoreSimulator { shocks }
    }

    /// Draw `n_simulations` game totals for the matchup.
    ///
    /// The caller validates the simulation count; this only rejects
    /// non-positive standard deviations, which cannot come out of a
    /// correctly configured profile store.
    pub fn simulate(
        &self,
        matchup: &Matchup,
        n_simulations: u32,
        seed: Option<u64>,
    ) -> Result<SimulationResult, EngineError> {
        let home_std = matchup.home.profile.scoring_std_dev;
        let away_std = matchup.away.profile.scoring_std_dev;
        if home_std <= 0.0 || away_std <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "scoring std devs must be positive, got {home_std} / {away_std}"
            )));
        }
        let home_dist = Normal::new(matchup.home_expected, home_std)
            .map_err(|e| EngineError::InvalidConfig(format!("home score distribution: {e}")))?;
        let away_dist = Normal::new(matchup.away_expected, away_std)
            .map_err(|e| EngineError::InvalidConfig(format!("away score distribution: {e}")))?;

        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        let cfg = &self.shocks;
        let mut totals = Vec::with_capacity(n_simulations as usize);
        for _ in 0..n_simulations {
            let mut home = home_dist.sample(&mut rng);
            let mut away = away_dist.sample(&mut rng);

            // Off-nights override the normal draw entirely.
            if rng.gen::<f64>() < cfg.bad_night_prob {
                home =
                    matchup.home_expected * rng.gen_range(cfg.bad_night_low..=cfg.bad_night_high);
            }
            if rng.gen::<f64>() < cfg.bad_night_prob {
                away =
                    matchup.away_expected * rng.gen_range(cfg.bad_night_low..=cfg.bad_night_high);
            }

            if rng.gen::<f64>() < cfg.slugfest_prob {
                let drop = rng.gen_range(cfg.slugfest_low..=cfg.slugfest_high);
                home -= drop / 2.0;
                away -= drop / 2.0;
            }

            home = home.max(cfg.score_floor);
            away = away.max(cfg.score_floor);
            totals.push(home + away);
        }

        Ok(summarize(totals))
    }
}

fn summarize(totals: Vec<f64>) -> SimulationResult {
    let n = totals.len() as f64;
    let mean = totals.iter().sum::<f64>() / n;
    let var = totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut sorted = totals.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let percentiles = PercentileTable {
        p1: percentile(&sorted, 1.0),
        p5: percentile(&sorted, 5.0),
        p10: percentile(&sorted, 10.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
    };

    SimulationResult {
        totals,
        mean,
        std_dev: var.sqrt(),
        min,
        max,
        percentiles,
    }
}

/// Linear-interpolated percentile over an already-sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
