//! Exit threshold resolution and evaluation.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::positions::{ExitReason, Position};
use crate::settings::TradingSettings;

/// Effective thresholds for one position, as positive fractions of entry.
/// A zero threshold disables that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitThresholds {
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
}

impl ExitThresholds {
    /// Stored per-position overrides, falling back to the global defaults.
    pub fn resolve(record: Option<&Position>, settings: &TradingSettings) -> Self {
        Self {
            take_profit: record
                .and_then(|p| p.take_profit_pct)
                .unwrap_or(settings.default_take_profit),
            stop_loss: record
                .and_then(|p| p.stop_loss_pct)
                .unwrap_or(settings.default_stop_loss),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.take_profit <= Decimal::ZERO && self.stop_loss <= Decimal::ZERO
    }
}

/// Decide whether a position should exit at `pnl_percent`.
///
/// Take-profit is checked first; at most one reason is returned.
pub fn evaluate_exit(pnl_percent: Decimal, thresholds: &ExitThresholds) -> Option<ExitReason> {
    if thresholds.take_profit > Decimal::ZERO && pnl_percent >= thresholds.take_profit {
        return Some(ExitReason::TakeProfit);
    }
    if thresholds.stop_loss > Decimal::ZERO && pnl_percent <= -thresholds.stop_loss {
        return Some(ExitReason::StopLoss);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thresholds(tp: Decimal, sl: Decimal) -> ExitThresholds {
        ExitThresholds {
            take_profit: tp,
            stop_loss: sl,
        }
    }

    #[test]
    fn test_take_profit() {
        let t = thresholds(dec!(0.30), dec!(0.25));
        assert_eq!(evaluate_exit(dec!(0.31), &t), Some(ExitReason::TakeProfit));
        assert_eq!(evaluate_exit(dec!(0.30), &t), Some(ExitReason::TakeProfit));
        assert_eq!(evaluate_exit(dec!(0.29), &t), None);
    }

    #[test]
    fn test_stop_loss() {
        let t = thresholds(dec!(0.30), dec!(0.25));
        assert_eq!(evaluate_exit(dec!(-0.26), &t), Some(ExitReason::StopLoss));
        assert_eq!(evaluate_exit(dec!(-0.25), &t), Some(ExitReason::StopLoss));
        assert_eq!(evaluate_exit(dec!(-0.24), &t), None);
    }

    #[test]
    fn test_zero_threshold_disables_side() {
        let no_tp = thresholds(Decimal::ZERO, dec!(0.25));
        assert_eq!(evaluate_exit(dec!(5.0), &no_tp), None);
        assert_eq!(evaluate_exit(dec!(-0.5), &no_tp), Some(ExitReason::StopLoss));

        let none = thresholds(Decimal::ZERO, Decimal::ZERO);
        assert!(none.is_disabled());
        assert_eq!(evaluate_exit(dec!(-0.99), &none), None);
    }

    #[test]
    fn test_resolve_defaults_without_record() {
        let settings = TradingSettings::default();
        let t = ExitThresholds::resolve(None, &settings);
        assert_eq!(t, thresholds(dec!(0.20), dec!(0.20)));
    }
}
