//! Team profiles and the read-only store that resolves them.
//!
//! The store is populated once per session from an external ratings
//! snapshot (efficiency, tempo) and optionally a game-history dump
//! (empirical scoring variance), then queried immutably for the rest of
//! the run. A lookup never fails: unknown teams resolve to a
//! league-average default profile, and the match quality travels with the
//! result so the decision layer can refuse to be confident about teams it
//! could not verify.

pub mod matching;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{MatchConfig, LEAGUE_AVG_EFFICIENCY, LEAGUE_AVG_TEMPO};
use crate::error::EngineError;
use matching::{normalize, resolve, NameMatch};

/// Scoring std dev assigned when neither history nor ratings say anything.
const DEFAULT_STD_DEV: f64 = 11.0;

/// Per-team ratings used by the expected-score model.
///
/// Efficiencies are points per 100 possessions adjusted for opponent
/// strength; tempo is possessions per 40 minutes. `scoring_std_dev` is the
/// empirical standard deviation of the team's own point totals, floored so
/// small samples cannot shrink the simulated variance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamProfile {
    pub name: String,
    pub offensive_efficiency: f64,
    pub defensive_efficiency: f64,
    pub tempo: f64,
    /// 0.0 in a snapshot means "unknown"; the store substitutes an
    /// efficiency-keyed estimate on insert.
    #[serde(default)]
    pub scoring_std_dev: f64,
}

impl TeamProfile {
    /// League-average profile handed out when a team cannot be resolved.
    pub fn league_default(name: &str) -> Self {
        TeamProfile {
            name: name.to_string(),
            offensive_efficiency: LEAGUE_AVG_EFFICIENCY,
            defensive_efficiency: LEAGUE_AVG_EFFICIENCY,
            tempo: LEAGUE_AVG_TEMPO,
            scoring_std_dev: DEFAULT_STD_DEV,
        }
    }

    /// Estimate scoring variance from offensive efficiency when a team has
    /// too little history. Elite offenses run hotter and steadier.
    fn estimated_std_dev(&self) -> f64 {
        if self.offensive_efficiency >= 115.0 {
            9.0
        } else if self.offensive_efficiency >= 105.0 {
            10.0
        } else {
            DEFAULT_STD_DEV
        }
    }
}

/// How confidently a free-text name was resolved to a profile.
///
/// Ordered from best to worst; the classifier caps achievable tiers when
/// either side is below `Exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchQuality {
    Exact,
    Partial,
    Default,
}

/// A lookup result: the profile plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedTeam {
    pub profile: TeamProfile,
    pub quality: MatchQuality,
    /// Canonical snapshot name the query resolved to, absent on default
    /// fallback.
    pub matched_name: Option<String>,
}

impl ResolvedTeam {
    pub fn is_verified(&self) -> bool {
        self.quality == MatchQuality::Exact
    }
}

/// One finished game from a history dump, used for variance ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameScore {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
}

/// Read-only resolver from free-text team names to profiles.
pub struct ProfileStore {
    /// Keyed by normalized name.
    teams: HashMap<String, TeamProfile>,
    config: MatchConfig,
}

impl ProfileStore {
    pub fn new(config: MatchConfig) -> Self {
        ProfileStore {
            teams: HashMap::new(),
            config,
        }
    }

    pub fn from_records(records: Vec<TeamProfile>, config: MatchConfig) -> Self {
        let mut store = ProfileStore::new(config);
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Parse a JSON snapshot: an array of profile records.
    pub fn from_json_str(json: &str, config: MatchConfig) -> Result<Self, EngineError> {
        let records: Vec<TeamProfile> = serde_json::from_str(json)?;
        Ok(Self::from_records(records, config))
    }

    /// Insert a profile, normalizing its variance field: unknown std devs
    /// get the efficiency-keyed estimate, known ones get the floor.
    pub fn insert(&mut self, mut profile: TeamProfile) {
        if profile.scoring_std_dev <= 0.0 {
            profile.scoring_std_dev = profile.estimated_std_dev();
        } else {
            profile.scoring_std_dev = profile.scoring_std_dev.max(self.config.std_dev_floor);
        }
        self.teams.insert(normalize(&profile.name), profile);
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Fold a game-history dump into per-team empirical scoring variance.
    ///
    /// Each team's own point totals (home and away) form the sample. Teams
    /// with fewer than the configured minimum keep their estimate; trusted
    /// samples are floored so a handful of consistent games cannot starve
    /// the simulator of variance.
    pub fn ingest_game_history(&mut self, games: &[GameScore]) {
        let mut scores: HashMap<String, Vec<f64>> = HashMap::new();
        for game in games {
            for (team, pts) in [
                (&game.home_team, game.home_score),
                (&game.away_team, game.away_score),
            ] {
                let key = normalize(team);
                if self.teams.contains_key(&key) {
                    scores.entry(key).or_default().push(f64::from(pts));
                }
            }
        }

        let mut updated = 0usize;
        for (key, sample) in scores {
            if sample.len() < self.config.min_games_for_variance {
                continue;
            }
            let std_dev = population_std_dev(&sample).max(self.config.std_dev_floor);
            if let Some(profile) = self.teams.get_mut(&key) {
                profile.scoring_std_dev = std_dev;
                updated += 1;
            }
        }
        debug!(teams = updated, "ingested game-history variance");
    }

    /// Resolve a free-text name to a profile. Never fails: the ladder is
    /// exact match, then partial (substring / shared token), then fuzzy
    /// similarity, then the league-average default.
    pub fn lookup(&self, name: &str) -> ResolvedTeam {
        let query = normalize(name);
        match resolve(
            &query,
            self.teams.keys().map(String::as_str),
            self.config.fuzzy_threshold,
        ) {
            Some((key, kind)) => {
                let profile = self.teams[key].clone();
                let quality = match kind {
                    NameMatch::Exact => MatchQuality::Exact,
                    NameMatch::Substring | NameMatch::TokenOverlap | NameMatch::Fuzzy => {
                        MatchQuality::Partial
                    }
                };
                debug!(query = name, matched = %profile.name, ?kind, "resolved team");
                ResolvedTeam {
                    matched_name: Some(profile.name.clone()),
                    profile,
                    quality,
                }
            }
            None => {
                warn!(query = name, "team not found, using league-average profile");
                ResolvedTeam {
                    profile: TeamProfile::league_default(name),
                    quality: MatchQuality::Default,
                    matched_name: None,
                }
            }
        }
    }
}

fn population_std_dev(sample: &[f64]) -> f64 {
    if sample.len() < 2 {
        return 0.0;
    }
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let var = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}
