//! Matchup expected-score model.
//!
//! Combines two teams' adjusted efficiency and tempo into expected points
//! for a specific game. The structure:
//! - **Game tempo**: both teams influence pace, blended with a league-
//!   average term so one extreme-tempo team cannot dominate the estimate.
//! - **Cross-adjusted scoring**: a team's expected output scales with the
//!   opponent's defensive efficiency, so elite defenses suppress and bad
//!   defenses inflate.
//! - **Home court**: a fixed net advantage, split between the home offense
//!   gaining and the away offense losing points.

use serde::Serialize;

use crate::config::{ModelConfig, LEAGUE_AVG_TEMPO};
use crate::profiles::{MatchQuality, ResolvedTeam};

/// Derived expectations and context flags for one game.
///
/// Built fresh per evaluation from the current profiles; nothing here is
/// cached across calls.
#[derive(Debug, Clone, Serialize)]
pub struct Matchup {
    pub home: ResolvedTeam,
    pub away: ResolvedTeam,
    pub game_tempo: f64,
    pub home_expected: f64,
    pub away_expected: f64,
    pub total_expected: f64,
    pub flags: MatchupFlags,
}

/// Context the classifier and diagnostics read off the raw profiles.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MatchupFlags {
    /// Either side's defense is elite.
    pub elite_defense: bool,
    /// Either side plays below the slow-tempo threshold.
    pub slow_tempo: bool,
    /// Either side's offense is weak.
    pub weak_offense: bool,
    /// Both offenses are at best mediocre.
    pub both_mediocre_offense: bool,
    /// Strong road defense visiting a mediocre home offense; these games
    /// crush totals more often than the efficiency product suggests.
    pub road_defense_squeeze: bool,
    /// Either team resolved below exact quality.
    pub degraded_data: bool,
}

/// Stateless builder over a [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct MatchupModel {
    config: ModelConfig,
}

impl MatchupModel {
    pub fn new(config: ModelConfig) -> Self {
        MatchupModel { config }
    }

    /// Compute expected points for both sides of a matchup.
    pub fn build(&self, home: ResolvedTeam, away: ResolvedTeam) -> Matchup {
        let cfg = &self.config;
        let h = &home.profile;
        let a = &away.profile;

        let game_tempo = cfg.tempo_weight_home * h.tempo
            + cfg.tempo_weight_away * a.tempo
            + cfg.tempo_weight_league * LEAGUE_AVG_TEMPO;

        // Points = (own offense x opponent defense / 100) / 100 x tempo.
        let home_off_rating = h.offensive_efficiency * a.defensive_efficiency / 100.0;
        let away_off_rating = a.offensive_efficiency * h.defensive_efficiency / 100.0;
        let mut home_expected = home_off_rating / 100.0 * game_tempo;
        let mut away_expected = away_off_rating / 100.0 * game_tempo;

        home_expected += cfg.home_advantage * cfg.home_offense_share;
        away_expected -= cfg.home_advantage * (1.0 - cfg.home_offense_share);

        let flags = MatchupFlags {
            elite_defense: h.defensive_efficiency < cfg.elite_defense_below
                || a.defensive_efficiency < cfg.elite_defense_below,
            slow_tempo: h.tempo < cfg.slow_tempo_below || a.tempo < cfg.slow_tempo_below,
            weak_offense: h.offensive_efficiency < cfg.weak_offense_below
                || a.offensive_efficiency < cfg.weak_offense_below,
            both_mediocre_offense: h.offensive_efficiency < cfg.mediocre_offense_below
                && a.offensive_efficiency < cfg.mediocre_offense_below,
            road_defense_squeeze: a.defensive_efficiency < cfg.road_defense_below
                && h.offensive_efficiency < cfg.squeezable_offense_below,
            degraded_data: home.quality != MatchQuality::Exact
                || away.quality != MatchQuality::Exact,
        };

        Matchup {
            total_expected: home_expected + away_expected,
            game_tempo,
            home_expected,
            away_expected,
            home,
            away,
            flags,
        }
    }
}
