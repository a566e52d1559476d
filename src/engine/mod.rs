//! Evaluation pipeline: request in, tiered decision out.
//!
//! [`TotalsEngine`] wires the stages together: validate the request,
//! resolve both teams, build the expected-score matchup, run the Monte
//! Carlo draw, measure it against the target line, classify into a tier,
//! and attach every data-quality note and diagnostic collected on the way.
//! The engine is immutable after construction, so a full slate of games
//! can be evaluated in parallel against the same instance.

pub mod decision;
pub mod evaluator;
pub mod matchup;
pub mod simulator;
pub mod staking;

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::profiles::{MatchQuality, ProfileStore, ResolvedTeam};

pub use decision::{ClassifierInput, Decision, DecisionClassifier, Tier};
pub use evaluator::{evaluate as evaluate_line, BetDirection, LineEvaluation};
pub use matchup::{Matchup, MatchupFlags, MatchupModel};
pub use simulator::{PercentileTable, ScoreSimulator, SimulationResult};

/// One game to evaluate against an alternate total line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRequest {
    pub home_team: String,
    pub away_team: String,
    /// The alternate total under evaluation.
    pub target_line: f64,
    pub direction: BetDirection,
    /// The book's main total, enabling the proximity diagnostic.
    pub standard_line: Option<f64>,
    /// Draw count; engine default when absent.
    pub n_simulations: Option<u32>,
    /// Reproducible draws for tests; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Tip-off date, enabling the early-season caution note.
    pub game_date: Option<NaiveDate>,
    /// Implied probability the market charges for this bet, enabling the
    /// Kelly cap on the stake hint.
    pub market_price: Option<f64>,
}

impl GameRequest {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        target_line: f64,
        direction: BetDirection,
    ) -> Self {
        GameRequest {
            home_team: home_team.into(),
            away_team: away_team.into(),
            target_line,
            direction,
            standard_line: None,
            n_simulations: None,
            seed: None,
            game_date: None,
            market_price: None,
        }
    }
}

/// Full evaluation of one game: the decision plus everything backing it.
#[derive(Debug, Clone, Serialize)]
pub struct GameEvaluation {
    pub home: ResolvedTeam,
    pub away: ResolvedTeam,
    pub target_line: f64,
    pub direction: BetDirection,
    pub decision: Decision,
    pub recommendation: String,
    /// Suggested bankroll fraction after the optional Kelly cap.
    pub stake_fraction: f64,
    pub hit_rate: f64,
    pub cushion: f64,
    pub simulated_mean: f64,
    pub simulated_range: (f64, f64),
    pub percentiles: PercentileTable,
    pub main_line_proximity: Option<f64>,
    pub data_quality_notes: Vec<String>,
    pub diagnostics: Vec<String>,
}

/// Outcome of one slate entry, keyed back to the request order.
#[derive(Debug)]
pub struct SlateOutcome {
    pub request_index: usize,
    pub result: Result<GameEvaluation, EngineError>,
}

/// Tier counts and aggregates over an evaluated slate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SlateSummary {
    pub requested: usize,
    pub evaluated: usize,
    pub errors: usize,
    pub lock: usize,
    pub safe: usize,
    pub lean: usize,
    pub maybe: usize,
    pub no_bet: usize,
    pub avg_hit_rate: f64,
}

/// Result of a batch run, including whether it was cut short.
#[derive(Debug)]
pub struct SlateReport {
    pub outcomes: Vec<SlateOutcome>,
    pub summary: SlateSummary,
    pub cancelled: bool,
}

/// The evaluation engine. Owns the profile store and configuration;
/// stateless across calls.
pub struct TotalsEngine {
    store: ProfileStore,
    config: EngineConfig,
    model: MatchupModel,
    simulator: ScoreSimulator,
    classifier: DecisionClassifier,
}

impl TotalsEngine {
    pub fn new(store: ProfileStore, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(TotalsEngine {
            model: MatchupModel::new(config.model.clone()),
            simulator: ScoreSimulator::new(config.shocks.clone()),
            classifier: DecisionClassifier::new(config.decision.clone()),
            store,
            config,
        })
    }

    /// Evaluate one game end to end.
    pub fn evaluate(&self, request: &GameRequest) -> Result<GameEvaluation, EngineError> {
        let n_simulations = self.validate(request)?;

        let home = self.store.lookup(&request.home_team);
        let away = self.store.lookup(&request.away_team);
        let matchup = self.model.build(home, away);

        let sim = self
            .simulator
            .simulate(&matchup, n_simulations, request.seed)?;
        let line_eval = evaluator::evaluate(
            &sim,
            request.target_line,
            request.direction,
            request.standard_line,
            self.config.decision.proximity_band,
        );

        let decision = self.classifier.classify(&ClassifierInput {
            home_team: &request.home_team,
            away_team: &request.away_team,
            direction: request.direction,
            hit_rate: line_eval.hit_rate,
            cushion: line_eval.cushion,
            home_quality: matchup.home.quality,
            away_quality: matchup.away.quality,
            elite_defense: matchup.flags.elite_defense,
        });

        let stake_fraction = staking::stake_hint(
            decision.stake_fraction,
            line_eval.hit_rate / 100.0,
            request.market_price,
            self.config.decision.kelly_fraction,
        );

        let data_quality_notes = quality_notes(&matchup.home, &matchup.away);
        let diagnostics = self.diagnostics(request, &matchup, &sim, &line_eval);
        let recommendation = recommendation(&decision, request);

        debug!(
            home = %request.home_team,
            away = %request.away_team,
            line = request.target_line,
            tier = decision.tier.label(),
            hit_rate = line_eval.hit_rate,
            "evaluated game"
        );

        Ok(GameEvaluation {
            home: matchup.home.clone(),
            away: matchup.away.clone(),
            target_line: request.target_line,
            direction: request.direction,
            recommendation,
            stake_fraction,
            hit_rate: line_eval.hit_rate,
            cushion: line_eval.cushion,
            simulated_mean: sim.mean,
            simulated_range: (sim.min, sim.max),
            percentiles: sim.percentiles,
            main_line_proximity: line_eval.main_line_proximity,
            data_quality_notes,
            diagnostics,
            decision,
        })
    }

    /// Evaluate a slate of games in parallel.
    ///
    /// Lookups are read-only and each game owns its draws, so games map
    /// cleanly across worker threads. The cancellation flag is checked
    /// before each game starts; in-flight games run to completion.
    pub fn evaluate_slate(
        &self,
        requests: &[GameRequest],
        cancel: Option<&AtomicBool>,
    ) -> SlateReport {
        let raw: Vec<Option<SlateOutcome>> = requests
            .par_iter()
            .enumerate()
            .map(|(request_index, request)| {
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    return None;
                }
                Some(SlateOutcome {
                    request_index,
                    result: self.evaluate(request),
                })
            })
            .collect();

        let cancelled = raw.iter().any(Option::is_none);
        let outcomes: Vec<SlateOutcome> = raw.into_iter().flatten().collect();

        let mut summary = SlateSummary {
            requested: requests.len(),
            ..SlateSummary::default()
        };
        let mut hit_rate_sum = 0.0;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(eval) => {
                    summary.evaluated += 1;
                    hit_rate_sum += eval.hit_rate;
                    match eval.decision.tier {
                        Tier::Lock => summary.lock += 1,
                        Tier::Safe => summary.safe += 1,
                        Tier::Lean => summary.lean += 1,
                        Tier::Maybe => summary.maybe += 1,
                        Tier::NoBet => summary.no_bet += 1,
                    }
                }
                Err(_) => summary.errors += 1,
            }
        }
        if summary.evaluated > 0 {
            summary.avg_hit_rate = hit_rate_sum / summary.evaluated as f64;
        }

        info!(
            requested = summary.requested,
            evaluated = summary.evaluated,
            lock = summary.lock,
            safe = summary.safe,
            lean = summary.lean,
            cancelled,
            "slate evaluated"
        );

        SlateReport {
            outcomes,
            summary,
            cancelled,
        }
    }

    /// Reject malformed input before any simulation work begins.
    fn validate(&self, request: &GameRequest) -> Result<u32, EngineError> {
        let n = request
            .n_simulations
            .unwrap_or(self.config.default_simulations);
        if n < self.config.min_simulations {
            return Err(EngineError::TooFewSimulations {
                n,
                min: self.config.min_simulations,
            });
        }
        if !request.target_line.is_finite() || request.target_line <= 0.0 {
            return Err(EngineError::InvalidLine(request.target_line));
        }
        if let Some(standard) = request.standard_line {
            if !standard.is_finite() || standard <= 0.0 {
                return Err(EngineError::InvalidStandardLine(standard));
            }
        }
        if let Some(price) = request.market_price {
            if !price.is_finite() || price <= 0.0 || price >= 1.0 {
                return Err(EngineError::InvalidMarketPrice(price));
            }
        }
        Ok(n)
    }

    fn diagnostics(
        &self,
        request: &GameRequest,
        matchup: &Matchup,
        sim: &SimulationResult,
        line_eval: &LineEvaluation,
    ) -> Vec<String> {
        let cfg = &self.config.decision;
        let mut out = Vec::new();
        let flags = &matchup.flags;

        if flags.elite_defense {
            out.push("elite defense in matchup".to_string());
        }
        if flags.slow_tempo {
            out.push("slow tempo expected".to_string());
        }
        if flags.both_mediocre_offense {
            out.push("both offenses are mediocre".to_string());
        } else if flags.weak_offense {
            out.push("weak offense in matchup".to_string());
        }
        if flags.road_defense_squeeze {
            out.push("strong road defense against a mediocre home offense".to_string());
        }
        if line_eval.tail_risk {
            let (pct, value) = match request.direction {
                BetDirection::Over => ("10th", sim.percentiles.p10),
                BetDirection::Under => ("90th", sim.percentiles.p90),
            };
            out.push(format!(
                "{pct} percentile ({value:.0}) crosses the target line ({:.1})",
                request.target_line
            ));
        }
        if let Some(proximity) = line_eval.main_line_proximity {
            if proximity < cfg.proximity_floor {
                out.push(format!(
                    "only {proximity:.0}% of simulations land within {:.0} points of the \
                     standard line, distribution disagrees with the market",
                    cfg.proximity_band
                ));
            }
        }
        if let Some(date) = request.game_date {
            if is_early_season(date, cfg.early_season_end_month, cfg.early_season_end_day) {
                out.push("early season, ratings built on small samples".to_string());
            }
        }
        out
    }
}

/// Nov through the configured mid-January cutoff counts as early season.
fn is_early_season(date: NaiveDate, end_month: u32, end_day: u32) -> bool {
    let month = date.month();
    if month >= 11 {
        return true;
    }
    month < end_month || (month == end_month && date.day() <= end_day)
}

fn quality_notes(home: &ResolvedTeam, away: &ResolvedTeam) -> Vec<String> {
    let mut notes = Vec::new();
    for (side, team) in [("home", home), ("away", away)] {
        match team.quality {
            MatchQuality::Exact => {}
            MatchQuality::Partial => notes.push(format!(
                "{side} team resolved by partial match to '{}'",
                team.matched_name.as_deref().unwrap_or("?")
            )),
            MatchQuality::Default => notes.push(format!(
                "{side} team '{}' not found, using league-average profile",
                team.profile.name
            )),
        }
    }
    notes
}

fn recommendation(decision: &Decision, request: &GameRequest) -> String {
    let side = match request.direction {
        BetDirection::Over => "OVER",
        BetDirection::Under => "UNDER",
    };
    match decision.tier {
        Tier::Lock | Tier::Safe | Tier::Lean => format!(
            "bet {side} {:.1} ({})",
            request.target_line, decision.label
        ),
        Tier::Maybe => format!("track {side} {:.1}, no bet", request.target_line),
        Tier::NoBet => "skip".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::profiles::TeamProfile;

    fn profile(name: &str, off: f64, def: f64, tempo: f64) -> TeamProfile {
        TeamProfile {
            name: name.to_string(),
            offensive_efficiency: off,
            defensive_efficiency: def,
            tempo,
            scoring_std_dev: 10.0,
        }
    }

    fn engine() -> TotalsEngine {
        let store = ProfileStore::from_records(
            vec![
                profile("Home U", 115.0, 95.0, 70.0),
                profile("Away Tech", 105.0, 100.0, 65.0),
                profile("Runner", 120.0, 110.0, 75.0),
                profile("Gunner", 118.0, 108.0, 74.0),
                profile("Fortress", 108.0, 87.0, 62.0),
                profile("Bastion", 106.0, 88.0, 63.0),
            ],
            MatchConfig::default(),
        );
        TotalsEngine::new(store, EngineConfig::default()).expect("engine builds")
    }

    fn seeded(home: &str, away: &str, line: f64, seed: u64) -> GameRequest {
        let mut req = GameRequest::new(home, away, line, BetDirection::Over);
        req.seed = Some(seed);
        req
    }

    #[test]
    fn fixed_seed_reproduces_the_full_evaluation() {
        // Scenario: 115/95/70 hosting 105/100/65, OVER 140, seed 42.
        let eng = engine();
        let req = seeded("Home U", "Away Tech", 140.0, 42);
        let a = eng.evaluate(&req).unwrap();
        let b = eng.evaluate(&req).unwrap();
        assert_eq!(a.hit_rate, b.hit_rate);
        assert_eq!(a.simulated_range, b.simulated_range);
        assert_eq!(a.decision.tier, b.decision.tier);
        // The expected total sits ~5-6 points above the line, so the hit
        // rate lands in a broad middle band whatever the seed.
        assert!(
            a.hit_rate > 40.0 && a.hit_rate < 90.0,
            "hit rate {:.1} outside the stable band",
            a.hit_rate
        );
    }

    #[test]
    fn different_seeds_give_different_draws() {
        let eng = engine();
        let a = eng.evaluate(&seeded("Home U", "Away Tech", 140.0, 1)).unwrap();
        let b = eng.evaluate(&seeded("Home U", "Away Tech", 140.0, 2)).unwrap();
        assert_ne!(a.simulated_range, b.simulated_range);
    }

    #[test]
    fn deep_cushion_over_is_a_lock() {
        // Two fast, leaky teams against a line ~55 points under the
        // expected total: essentially every draw clears it.
        let eng = engine();
        let eval = eng.evaluate(&seeded("Runner", "Gunner", 140.0, 42)).unwrap();
        assert!(eval.hit_rate > 99.0, "hit rate {:.1}", eval.hit_rate);
        assert!(eval.cushion > 35.0, "cushion {:.1}", eval.cushion);
        assert_eq!(eval.decision.tier, Tier::Lock);
        assert!(eval.recommendation.contains("OVER"));
        assert!(eval.stake_fraction > 0.0);
    }

    #[test]
    fn unknown_away_team_caps_lock_numbers() {
        // Same lock-grade numbers, but the away side resolves to the
        // default profile: the tier must stay below Lock/Safe.
        let eng = engine();
        let eval = eng
            .evaluate(&seeded("Runner", "Nowhere Clown College", 120.0, 42))
            .unwrap();
        assert_eq!(eval.away.quality, MatchQuality::Default);
        assert!(
            eval.hit_rate > 99.0 && eval.cushion > 35.0,
            "numbers should be lock-grade (hit {:.1}, cushion {:.1})",
            eval.hit_rate,
            eval.cushion
        );
        assert_eq!(eval.decision.tier, Tier::Lean);
        assert!(!eval.data_quality_notes.is_empty());
    }

    #[test]
    fn too_few_simulations_is_rejected_before_drawing() {
        let eng = engine();
        let mut req = seeded("Home U", "Away Tech", 140.0, 42);
        req.n_simulations = Some(5);
        match eng.evaluate(&req) {
            Err(EngineError::TooFewSimulations { n: 5, min: 1000 }) => {}
            other => panic!("expected TooFewSimulations, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_line_is_rejected() {
        let eng = engine();
        let req = seeded("Home U", "Away Tech", f64::NAN, 42);
        assert!(matches!(eng.evaluate(&req), Err(EngineError::InvalidLine(_))));
        let req = seeded("Home U", "Away Tech", -10.0, 42);
        assert!(matches!(eng.evaluate(&req), Err(EngineError::InvalidLine(_))));
    }

    #[test]
    fn bad_market_price_is_rejected() {
        let eng = engine();
        let mut req = seeded("Home U", "Away Tech", 140.0, 42);
        req.market_price = Some(1.2);
        assert!(matches!(
            eng.evaluate(&req),
            Err(EngineError::InvalidMarketPrice(_))
        ));
    }

    #[test]
    fn elite_defense_matchup_is_flagged() {
        let eng = engine();
        let eval = eng.evaluate(&seeded("Fortress", "Bastion", 110.0, 42)).unwrap();
        assert!(eval
            .diagnostics
            .iter()
            .any(|d| d.contains("elite defense")));
        assert!(eval.diagnostics.iter().any(|d| d.contains("slow tempo")));
    }

    #[test]
    fn low_proximity_to_standard_line_is_flagged() {
        // Standard line far above anything the simulation produces.
        let eng = engine();
        let mut req = seeded("Fortress", "Bastion", 110.0, 42);
        req.standard_line = Some(200.0);
        let eval = eng.evaluate(&req).unwrap();
        let proximity = eval.main_line_proximity.unwrap();
        assert!(proximity < 70.0, "proximity {proximity:.1}");
        assert!(eval
            .diagnostics
            .iter()
            .any(|d| d.contains("standard line")));
    }

    #[test]
    fn early_season_date_adds_caution_note() {
        let eng = engine();
        let mut req = seeded("Home U", "Away Tech", 140.0, 42);
        req.game_date = NaiveDate::from_ymd_opt(2024, 11, 20);
        let eval = eng.evaluate(&req).unwrap();
        assert!(eval.diagnostics.iter().any(|d| d.contains("early season")));

        let mut late = seeded("Home U", "Away Tech", 140.0, 42);
        late.game_date = NaiveDate::from_ymd_opt(2025, 2, 10);
        let eval = eng.evaluate(&late).unwrap();
        assert!(!eval.diagnostics.iter().any(|d| d.contains("early season")));
    }

    #[test]
    fn under_direction_evaluates_against_the_ceiling() {
        let eng = engine();
        let mut req = GameRequest::new("Fortress", "Bastion", 160.0, BetDirection::Under);
        req.seed = Some(42);
        let eval = eng.evaluate(&req).unwrap();
        // Two elite defenses at a crawl: totals live far below 160.
        assert!(eval.hit_rate > 95.0, "hit rate {:.1}", eval.hit_rate);
        assert!(eval.cushion > 0.0);
    }

    #[test]
    fn slate_counts_tiers_and_averages() {
        let eng = engine();
        let slate = vec![
            seeded("Runner", "Gunner", 140.0, 42),
            seeded("Home U", "Away Tech", 140.0, 42),
            {
                let mut bad = seeded("Home U", "Away Tech", 140.0, 42);
                bad.n_simulations = Some(1);
                bad
            },
        ];
        let report = eng.evaluate_slate(&slate, None);
        assert!(!report.cancelled);
        assert_eq!(report.summary.requested, 3);
        assert_eq!(report.summary.evaluated, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.lock, 1);
        assert!(report.summary.avg_hit_rate > 0.0);
        assert_eq!(report.outcomes.len(), 3);
    }

    #[test]
    fn pre_cancelled_slate_runs_nothing() {
        let eng = engine();
        let slate = vec![
            seeded("Runner", "Gunner", 140.0, 42),
            seeded("Home U", "Away Tech", 140.0, 42),
        ];
        let cancel = AtomicBool::new(true);
        let report = eng.evaluate_slate(&slate, Some(&cancel));
        assert!(report.cancelled);
        assert!(report.outcomes.is_empty());
        assert_eq!(report.summary.evaluated, 0);
    }

    #[test]
    fn early_season_boundary_dates() {
        assert!(is_early_season(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            1,
            15
        ));
        assert!(!is_early_season(
            NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
            1,
            15
        ));
        assert!(is_early_season(
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            1,
            15
        ));
    }
}
