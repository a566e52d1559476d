//! Line evaluation: hit rate, cushion, and distribution diagnostics.
//!
//! Pure computation over an already-generated simulation. An "over" bet
//! (alternate minimum) wins when the total reaches the line; an "under"
//! bet (alternate maximum) wins when it stays below. Cushion is the signed
//! distance from the simulated mean to the line in the bet's favorable
//! direction, the safety margin the tier ladder keys on.

use serde::{Deserialize, Serialize};

use crate::engine::simulator::SimulationResult;

/// Which side of the alternate line the bet takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetDirection {
    /// Alternate minimum: total must reach the line.
    Over,
    /// Alternate maximum: total must stay below the line.
    Under,
}

/// A simulation measured against one target line.
#[derive(Debug, Clone, Serialize)]
pub struct LineEvaluation {
    pub target_line: f64,
    pub direction: BetDirection,
    /// Percentage of simulated totals satisfying the bet, in [0, 100].
    pub hit_rate: f64,
    /// Simulated mean minus line for overs, line minus mean for unders.
    pub cushion: f64,
    /// Share of totals landing within the configured band of the standard
    /// line, on the bet's side. Low values mean the simulated distribution
    /// disagrees with the market's own number.
    pub main_line_proximity: Option<f64>,
    /// The tail percentile crosses the line: the 10th percentile sits
    /// below an over line, or the 90th sits above an under line.
    pub tail_risk: bool,
}

/// Measure a simulation against a target line.
pub fn evaluate(
    sim: &SimulationResult,
    target_line: f64,
    direction: BetDirection,
    standard_line: Option<f64>,
    proximity_band: f64,
) -> LineEvaluation {
    let n = sim.totals.len() as f64;
    let hits = sim
        .totals
        .iter()
        .filter(|&&t| match direction {
            BetDirection::Over => t >= target_line,
            BetDirection::Under => t < target_line,
        })
        .count();
    let hit_rate = hits as f64 / n * 100.0;

    let cushion = match direction {
        BetDirection::Over => sim.mean - target_line,
        BetDirection::Under => target_line - sim.mean,
    };

    let main_line_proximity = standard_line.map(|standard| {
        let close = sim
            .totals
            .iter()
            .filter(|&&t| match direction {
                BetDirection::Over => t >= standard - proximity_band,
                BetDirection::Under => t <= standard + proximity_band,
            })
            .count();
        close as f64 / n * 100.0
    });

    let tail_risk = match direction {
        BetDirection::Over => sim.percentiles.p10 < target_line,
        BetDirection::Under => sim.percentiles.p90 >= target_line,
    };

    LineEvaluation {
        target_line,
        direction,
        hit_rate,
        cushion,
        main_line_proximity,
        tail_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulator::{PercentileTable, SimulationResult};
    use approx::assert_relative_eq;

    /// Build a result whose totals are an arithmetic ramp, handy for exact
    /// hit-rate arithmetic.
    fn ramp(from: f64, to: f64, n: usize) -> SimulationResult {
        let step = (to - from) / (n - 1) as f64;
        let totals: Vec<f64> = (0..n).map(|i| from + step * i as f64).collect();
        let mean = totals.iter().sum::<f64>() / n as f64;
        let pick = |pct: f64| {
            let rank = (pct / 100.0 * (n - 1) as f64).round() as usize;
            totals[rank]
        };
        SimulationResult {
            mean,
            std_dev: 0.0,
            min: from,
            max: to,
            percentiles: PercentileTable {
                p1: pick(1.0),
                p5: pick(5.0),
                p10: pick(10.0),
                p25: pick(25.0),
                p50: pick(50.0),
                p75: pick(75.0),
                p90: pick(90.0),
            },
            totals,
        }
    }

    #[test]
    fn over_hit_rate_counts_at_or_above_line() {
        // Totals 100..=199, line 150: exactly 50 of 100 qualify.
        let sim = ramp(100.0, 199.0, 100);
        let eval = evaluate(&sim, 150.0, BetDirection::Over, None, 10.0);
        assert_relative_eq!(eval.hit_rate, 50.0, epsilon = 1e-9);
        assert_relative_eq!(eval.cushion, sim.mean - 150.0, epsilon = 1e-9);
    }

    #[test]
    fn under_hit_rate_counts_strictly_below_line() {
        let sim = ramp(100.0, 199.0, 100);
        let eval = evaluate(&sim, 150.0, BetDirection::Under, None, 10.0);
        assert_relative_eq!(eval.hit_rate, 50.0, epsilon = 1e-9);
        assert_relative_eq!(eval.cushion, 150.0 - sim.mean, epsilon = 1e-9);
    }

    #[test]
    fn over_and_under_hit_rates_are_complementary() {
        let sim = ramp(110.0, 180.0, 500);
        let over = evaluate(&sim, 145.0, BetDirection::Over, None, 10.0);
        let under = evaluate(&sim, 145.0, BetDirection::Under, None, 10.0);
        assert_relative_eq!(over.hit_rate + under.hit_rate, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn raising_an_over_line_never_raises_hit_rate() {
        let sim = ramp(100.0, 200.0, 1_000);
        let mut last = 101.0;
        for line in [110.0, 130.0, 150.0, 170.0, 190.0] {
            let eval = evaluate(&sim, line, BetDirection::Over, None, 10.0);
            assert!(
                eval.hit_rate <= last,
                "hit rate rose from {last:.1} to {:.1} at line {line}",
                eval.hit_rate
            );
            last = eval.hit_rate;
        }
    }

    #[test]
    fn cushion_sign_matches_favorable_side() {
        let sim = ramp(140.0, 160.0, 100);
        // Mean 150: an over line below the mean has positive cushion.
        let over = evaluate(&sim, 140.0, BetDirection::Over, None, 10.0);
        assert!(over.cushion > 0.0);
        let over_bad = evaluate(&sim, 160.0, BetDirection::Over, None, 10.0);
        assert!(over_bad.cushion < 0.0);
        let under = evaluate(&sim, 160.0, BetDirection::Under, None, 10.0);
        assert!(under.cushion > 0.0);
        let under_bad = evaluate(&sim, 140.0, BetDirection::Under, None, 10.0);
        assert!(under_bad.cushion < 0.0);
    }

    #[test]
    fn proximity_measures_band_around_standard_line() {
        // Totals 100..=199, standard 160, band 10: totals >= 150 qualify.
        let sim = ramp(100.0, 199.0, 100);
        let eval = evaluate(&sim, 140.0, BetDirection::Over, Some(160.0), 10.0);
        assert_relative_eq!(eval.main_line_proximity.unwrap(), 50.0, epsilon = 1e-9);
        let none = evaluate(&sim, 140.0, BetDirection::Over, None, 10.0);
        assert!(none.main_line_proximity.is_none());
    }

    #[test]
    fn tail_risk_tracks_percentile_crossing() {
        let sim = ramp(100.0, 199.0, 100);
        // p10 is ~110: an over line above it is tail risk.
        let risky = evaluate(&sim, 130.0, BetDirection::Over, None, 10.0);
        assert!(risky.tail_risk);
        let safe = evaluate(&sim, 105.0, BetDirection::Over, None, 10.0);
        assert!(!safe.tail_risk);
        // p90 is ~190: an under line below it is tail risk.
        let under_risky = evaluate(&sim, 170.0, BetDirection::Under, None, 10.0);
        assert!(under_risky.tail_risk);
        let under_safe = evaluate(&sim, 195.0, BetDirection::Under, None, 10.0);
        assert!(!under_safe.tail_risk);
    }
}
