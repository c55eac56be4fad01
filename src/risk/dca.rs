//! Dollar-cost-averaging planner
//!
//! Computes the new average price after an additional purchase.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs to the DCA planner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaInputs {
    pub current_shares: u64,
    pub current_avg_price: Decimal,
    pub new_price: Decimal,
    pub invest_amount: Decimal,
}

/// DCA result; companion tool contract to the position sizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaResult {
    pub new_total_shares: u64,
    pub new_avg_price: Decimal,
    pub total_invested: Decimal,
    pub summary: String,
}

/// Calculate the new average price after a purchase
pub fn calculate_dca(inputs: &DcaInputs) -> DcaResult {
    let new_shares = if inputs.new_price > Decimal::ZERO {
        (inputs.invest_amount / inputs.new_price)
            .floor()
            .to_u64()
            .unwrap_or(0)
    } else {
        0
    };

    let total_shares = inputs.current_shares + new_shares;
    let current_total_value =
        Decimal::from(inputs.current_shares) * inputs.current_avg_price;
    let new_investment_value = Decimal::from(new_shares) * inputs.new_price;
    let total_invested = current_total_value + new_investment_value;

    let new_avg_price = if total_shares > 0 {
        total_invested / Decimal::from(total_shares)
    } else {
        Decimal::ZERO
    };

    let summary = format!(
        "Buying {} shares at ${} brings your average from ${} to ${:.2}.",
        new_shares, inputs.new_price, inputs.current_avg_price, new_avg_price
    );

    DcaResult {
        new_total_shares: total_shares,
        new_avg_price: new_avg_price.round_dp(2),
        total_invested: total_invested.round_dp(2),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_average_down() {
        let result = calculate_dca(&DcaInputs {
            current_shares: 10,
            current_avg_price: dec!(200),
            new_price: dec!(180),
            invest_amount: dec!(5000),
        });

        // floor(5000 / 180) = 27 new shares
        assert_eq!(result.new_total_shares, 37);
        // (10*200 + 27*180) / 37 = 185.41 at two decimal places
        assert_eq!(result.new_avg_price, dec!(185.41));
        assert_eq!(result.total_invested, dec!(6860.00));
    }

    #[test]
    fn test_share_count_floors() {
        let result = calculate_dca(&DcaInputs {
            current_shares: 0,
            current_avg_price: dec!(0),
            new_price: dec!(300),
            invest_amount: dec!(1000),
        });

        // floor(1000 / 300) = 3, not 3.33
        assert_eq!(result.new_total_shares, 3);
        assert_eq!(result.new_avg_price, dec!(300.00));
        assert_eq!(result.total_invested, dec!(900.00));
    }

    #[test]
    fn test_zero_total_shares_yields_zero_average() {
        let result = calculate_dca(&DcaInputs {
            current_shares: 0,
            current_avg_price: dec!(0),
            new_price: dec!(500),
            invest_amount: dec!(100),
        });

        assert_eq!(result.new_total_shares, 0);
        assert_eq!(result.new_avg_price, dec!(0));
    }

    #[test]
    fn test_non_positive_price_buys_nothing() {
        let result = calculate_dca(&DcaInputs {
            current_shares: 10,
            current_avg_price: dec!(200),
            new_price: dec!(0),
            invest_amount: dec!(5000),
        });

        assert_eq!(result.new_total_shares, 10);
        assert_eq!(result.new_avg_price, dec!(200.00));
    }
}
