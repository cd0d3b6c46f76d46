//! Pricing for raising the factor.
//!
//! The price grows with the player's lifetime earnings and super-linearly with how far the
//! factor is raised above neutral:
//!
//! `cost = round((base_fee + inflation * total_earned) * (multiplier - 1) ^ penalty_exponent)`
//!
//! [`CostSettings::offer`] is the purchase step: quote, check the balance, then write the new
//! factor into the shared [`FactorConfig`].

use crate::factor::FactorConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Lowest selectable multiplier.
pub const MIN_MULTIPLIER: f64 = 1.0;
/// Highest selectable multiplier.
pub const MAX_MULTIPLIER: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    pub base_fee: u32,
    /// Share of lifetime earnings added to the base fee
    pub inflation_coefficient: f64,
    pub penalty_exponent: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            base_fee: 500,
            inflation_coefficient: 0.001,
            penalty_exponent: 1.5,
        }
    }
}

/// Result of an attempted purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Offer {
    /// The factor was set and `cost` debited, leaving `remaining`.
    Accepted { cost: u64, remaining: u64 },
    /// `balance` does not cover `cost`; nothing changed.
    Insufficient { cost: u64, balance: u64 },
}

impl CostSettings {
    pub fn offering_cost(&self, multiplier: f64, total_earned: u64) -> u64 {
        offering_cost(
            multiplier,
            self.base_fee,
            self.inflation_coefficient,
            self.penalty_exponent,
            total_earned,
        )
    }

    /// Price of the factor at slider `position`, as `(multiplier, cost)`.
    pub fn quote(&self, position: f64, total_earned: u64) -> (f64, u64) {
        let multiplier = multiplier_from_slider(position);
        (multiplier, self.offering_cost(multiplier, total_earned))
    }

    /// Buys `multiplier` out of `balance`. The factor only changes when the balance covers it.
    pub fn offer(
        &self,
        config: &FactorConfig,
        multiplier: f64,
        balance: u64,
        total_earned: u64,
    ) -> Offer {
        let cost = self.offering_cost(multiplier, total_earned);
        let Some(remaining) = balance.checked_sub(cost) else {
            return Offer::Insufficient { cost, balance };
        };
        config.set_factor(multiplier);
        info!("offered {}g, factor set to {:.1}x", cost, multiplier);
        Offer::Accepted { cost, remaining }
    }
}

/// Price of setting the factor to `multiplier`. Never negative; neutral is free.
pub fn offering_cost(
    multiplier: f64,
    base_fee: u32,
    inflation_coefficient: f64,
    penalty_exponent: f64,
    total_earned: u64,
) -> u64 {
    let boost = (multiplier - MIN_MULTIPLIER).max(0.0);
    let scale = base_fee as f64 + inflation_coefficient * total_earned as f64;
    let cost = (scale * boost.powf(penalty_exponent)).round();
    if cost.is_finite() && cost > 0.0 {
        cost as u64
    } else {
        0
    }
}

/// Maps a slider position in `[0, 1]` onto the multiplier range.
pub fn multiplier_from_slider(position: f64) -> f64 {
    let position = if position.is_nan() { 0.0 } else { position.clamp(0.0, 1.0) };
    MIN_MULTIPLIER + position * (MAX_MULTIPLIER - MIN_MULTIPLIER)
}
