use thiserror::Error;

/// Errors surfaced by the evaluation pipeline.
///
/// These cover programmer/input mistakes only. Missing or low-confidence
/// team data is never an error: the store resolves it to a default profile
/// and the degradation is carried through as data-quality notes on the
/// final decision.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Percentile estimates are unstable below ~1,000 draws.
    #[error("n_simulations must be at least {min}, got {n}")]
    TooFewSimulations { n: u32, min: u32 },

    #[error("target line must be finite and positive, got {0}")]
    InvalidLine(f64),

    #[error("standard line must be finite and positive, got {0}")]
    InvalidStandardLine(f64),

    /// Market prices are implied probabilities and must sit strictly
    /// inside (0, 1).
    #[error("market price must be in (0, 1), got {0}")]
    InvalidMarketPrice(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse profile snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}
