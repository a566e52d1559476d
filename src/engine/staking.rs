//! Stake-sizing hints.
//!
//! A qualified tier carries a flat bankroll fraction from configuration.
//! When the caller also supplies the market price of the alternate-line
//! bet (as an implied probability), a fractional Kelly stake is computed
//! from the simulated hit rate and the flat fraction is capped by it, so
//! the hint never exceeds what the model's own edge justifies.
//!
//! Kelly:
//!   f* = (b·p − q) / b
//! where b is the net odds per unit staked ((1/price) − 1), p the
//! estimated win probability, and q = 1 − p. The fractional multiplier
//! trades a little expected growth for much less variance.

/// Kelly stake fraction for a bet priced as an implied probability.
///
/// Returns 0.0 when the edge is non-positive or the price is degenerate.
pub fn kelly_stake(win_prob: f64, implied_price: f64, kelly_fraction: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&win_prob), "win_prob out of range");
    debug_assert!(
        (0.0..=1.0).contains(&kelly_fraction),
        "kelly_fraction out of range"
    );

    if implied_price <= 0.0 || implied_price >= 1.0 {
        return 0.0;
    }

    let b = (1.0 / implied_price) - 1.0;
    let p = win_prob;
    let q = 1.0 - p;

    let f = (b * p - q) / b;
    if f <= 0.0 {
        return 0.0; // no edge
    }

    (f * kelly_fraction).clamp(0.0, 1.0)
}

/// Expected-value edge of the bet: positive when the model's probability
/// beats the market's implied one.
pub fn edge(win_prob: f64, implied_price: f64) -> f64 {
    if implied_price <= 0.0 {
        return 0.0;
    }
    win_prob / implied_price - 1.0
}

/// Final stake hint: the tier's flat fraction, capped by fractional Kelly
/// when a market price is available.
pub fn stake_hint(
    tier_fraction: f64,
    win_prob: f64,
    market_price: Option<f64>,
    kelly_fraction: f64,
) -> f64 {
    if tier_fraction <= 0.0 {
        return 0.0;
    }
    match market_price {
        Some(price) => tier_fraction.min(kelly_stake(win_prob, price, kelly_fraction)),
        None => tier_fraction,
    }
}
