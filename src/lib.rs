//! Monte Carlo evaluation of college-basketball alternate total lines.
//!
//! Given two teams' adjusted efficiency ratings, tempo, and empirical
//! scoring variance, the engine simulates thousands of final scores,
//! measures the distribution against a sportsbook alternate line, and
//! classifies the game into a confidence tier with a stake-sizing hint.
//!
//! Pipeline:
//! 1. **Profile store** resolves free-text team names to ratings, falling
//!    back to a league-average profile and flagging the match quality.
//! 2. **Matchup model** turns both profiles into expected points per side
//!    (tempo blend, efficiency cross-adjustment, home court).
//! 3. **Simulator** draws N totals from normals widened by rare-event
//!    shocks (off-nights, defensive slugfests).
//! 4. **Evaluator** computes the hit rate and cushion against the line.
//! 5. **Classifier** assigns a tier from configurable thresholds, then
//!    applies downgrade rules so degraded data or risky matchups never
//!    surface as high confidence.
//!
//! Everything upstream of the store (odds feeds, scrapers, trackers,
//! dashboards) and downstream of the decision lives outside this crate;
//! the boundary is plain in-memory types.
//!
//! ```no_run
//! use cbb_totals::{BetDirection, EngineConfig, GameRequest, ProfileStore, TotalsEngine};
//!
//! # fn main() -> Result<(), cbb_totals::EngineError> {
//! let config = EngineConfig::default();
//! let snapshot = std::fs::read_to_string("ratings.json").unwrap();
//! let store = ProfileStore::from_json_str(&snapshot, config.matching.clone())?;
//! let engine = TotalsEngine::new(store, config)?;
//!
//! let request = GameRequest::new("Kansas", "Duke", 142.5, BetDirection::Over);
//! let eval = engine.evaluate(&request)?;
//! println!("{}: {:.1}% hit rate", eval.recommendation, eval.hit_rate);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod profiles;

pub use config::{
    DecisionConfig, EngineConfig, MatchConfig, ModelConfig, ShockConfig, TierLadder,
    TierThreshold,
};
pub use engine::{
    BetDirection, Decision, GameEvaluation, GameRequest, LineEvaluation, PercentileTable,
    SimulationResult, SlateReport, SlateSummary, Tier, TotalsEngine,
};
pub use error::EngineError;
pub use profiles::{GameScore, MatchQuality, ProfileStore, ResolvedTeam, TeamProfile};
