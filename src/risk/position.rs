//! Risk-percent position sizing
//!
//! Sizes a position so that the loss between entry and stop is at most the
//! requested percentage of the account.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs to the position sizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInputs {
    pub account_size: Decimal,
    pub max_risk_pct: Decimal,
    pub entry_price: Decimal,
    pub stop_price: Decimal,
}

/// Sizing result; the tool contract consumed by chat integrations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResult {
    pub max_dollar_risk: Decimal,
    pub position_size_shares: u64,
    pub risk_per_share: Decimal,
    pub summary: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PositionResult {
    fn invalid(summary: &str, error: &str) -> Self {
        Self {
            max_dollar_risk: Decimal::ZERO,
            position_size_shares: 0,
            risk_per_share: Decimal::ZERO,
            summary: summary.to_string(),
            is_valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Calculate position size so that the loss between entry and stop is at
/// most `max_risk_pct` of the account.
pub fn calculate_position_size(inputs: &PositionInputs) -> PositionResult {
    if inputs.entry_price <= Decimal::ZERO
        || inputs.stop_price <= Decimal::ZERO
        || inputs.account_size <= Decimal::ZERO
    {
        return PositionResult::invalid(
            "Prices and account size must be positive numbers.",
            "Values must be positive.",
        );
    }

    let max_dollar_risk =
        inputs.account_size * (inputs.max_risk_pct / Decimal::ONE_HUNDRED);
    let risk_per_share = (inputs.entry_price - inputs.stop_price).abs();

    if risk_per_share.is_zero() {
        return PositionResult::invalid(
            "Entry and stop price cannot be the same.",
            "Invalid spread.",
        );
    }

    let position_size_shares = (max_dollar_risk / risk_per_share)
        .floor()
        .to_u64()
        .unwrap_or(0);

    let summary = format!(
        "With a ${:.2} account and {:.2}% max risk, you can risk up to ${:.2}. \
         At an entry of ${:.2} and stop at ${:.2}, risk per share is ${:.2}, \
         so you can buy {} shares.",
        inputs.account_size,
        inputs.max_risk_pct,
        max_dollar_risk,
        inputs.entry_price,
        inputs.stop_price,
        risk_per_share,
        position_size_shares
    );

    PositionResult {
        max_dollar_risk: max_dollar_risk.round_dp(2),
        position_size_shares,
        risk_per_share: risk_per_share.round_dp(2),
        summary,
        is_valid: true,
        error: None,
    }
}
