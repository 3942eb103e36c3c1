//! Compound accumulation engine

use serde::{Deserialize, Serialize};

/// Inputs for one accumulation run. Built per recompute, never persisted
/// directly; a saved calculation stores a flattened copy alongside the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulationInput {
    pub principal: f64,
    pub daily_rate_percent: f64,
    pub days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulationResult {
    pub final_amount: f64,
    pub profit: f64,
    pub profit_percent: f64,
}

/// Applies compound growth once per day, reinvesting the running amount.
///
/// The loop is intentionally iterative rather than `(1 + r)^n`: the documented
/// domain is at most 365 days and the per-day reinvestment semantics must match
/// the amounts a user would see accumulating day by day.
///
/// The engine performs no validation. A zero principal yields an all-zero
/// result with `profit_percent` pinned to 0, a negative rate decays the
/// amount, and non-finite inputs propagate into the result untouched.
pub fn accumulate(input: &AccumulationInput) -> AccumulationResult {
    let mut amount = input.principal;
    for _ in 0..input.days {
        amount += amount * (input.daily_rate_percent / 100.0);
    }

    let profit = amount - input.principal;
    let profit_percent = if input.principal > 0.0 {
        (profit / input.principal) * 100.0
    } else {
        0.0
    };

    AccumulationResult {
        final_amount: amount,
        profit,
        profit_percent,
    }
}
