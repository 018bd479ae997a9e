//! Budget aggregation: summaries, chart slices and remaining amounts.

use budgetly_shared::Amount;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::BudgetSnapshot;

/// Name of one entry of a [`BudgetSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryPartKind {
    /// Expenses total.
    Bills,
    /// Debt total.
    Debt,
    /// Savings total.
    Savings,
    /// Unallocated budget, floored at zero.
    Left,
}

impl SummaryPartKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bills => "Bills",
            Self::Debt => "Debt",
            Self::Savings => "Savings",
            Self::Left => "Left",
        }
    }
}

/// One line of the breakdown list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPart {
    /// Which part this is.
    pub name: SummaryPartKind,
    /// Amount.
    pub value: Amount,
    /// Whole percent of the total budget.
    pub pct: u8,
}

/// Breakdown list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Unallocated budget, floored at zero.
    pub left: Amount,
    /// Bills, Debt, Savings, Left, always in that order.
    pub parts: [SummaryPart; 4],
}

/// Name of one donut-chart slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliceKind {
    /// Expenses total.
    Expenses,
    /// Debt total.
    Debt,
    /// Savings total.
    Savings,
    /// Unallocated budget, floored at zero.
    Remaining,
}

impl SliceKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Expenses => "Expenses",
            Self::Debt => "Debt",
            Self::Savings => "Savings",
            Self::Remaining => "Remaining",
        }
    }

    /// Fixed display color, as a CSS hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Expenses => "#a855f7",
            Self::Debt => "#ef4444",
            Self::Savings => "#10b981",
            Self::Remaining => "#3b82f6",
        }
    }
}

/// One donut-chart slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    /// Which slice this is.
    pub name: SliceKind,
    /// Amount.
    pub value: Amount,
    /// Display color.
    pub color: &'static str,
    /// Whole percent of the total budget.
    pub percentage: u8,
}

/// Both forms of the remaining amount.
///
/// `signed` drives the over-budget warning, `floored` drives proportions.
/// They intentionally differ once the budget is over-allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingView {
    /// `total - bills - debt - savings`; negative when over-allocated.
    pub signed: Decimal,
    /// `max(signed, 0)`.
    pub floored: Amount,
    /// True when `signed < 0`.
    pub over_allocated: bool,
}

impl RemainingView {
    /// Absolute value of the signed remaining, for display next to a
    /// warning.
    #[must_use]
    pub fn magnitude(&self) -> Decimal {
        self.signed.abs()
    }
}

/// Budget aggregation rules.
///
/// Every function is total: any input produces an answer and nothing here
/// panics or divides by zero.
pub struct BudgetAggregator;

impl BudgetAggregator {
    /// Computes the breakdown list.
    ///
    /// Percentages use `max(total, 1)` as divisor and are rounded
    /// independently, so they need not add up to 100. With no budget set
    /// every percentage is 0.
    #[must_use]
    pub fn compute_summary(input: &BudgetSnapshot) -> BudgetSummary {
        let left = input.total_amount.saturating_sub(input.planned());
        let safe_total = input.total_amount.max(Amount::new(Decimal::ONE));
        let pct = |value: Amount| {
            if input.total_amount.is_zero() {
                0
            } else {
                whole_percent(value, safe_total)
            }
        };

        let part = |name, value| SummaryPart {
            name,
            value,
            pct: pct(value),
        };

        BudgetSummary {
            left,
            parts: [
                part(SummaryPartKind::Bills, input.bills),
                part(SummaryPartKind::Debt, input.debt),
                part(SummaryPartKind::Savings, input.savings),
                part(SummaryPartKind::Left, left),
            ],
        }
    }

    /// Sums a loosely-typed sub-item map.
    ///
    /// Values are coerced like form input: numbers and numeric strings count,
    /// anything else (including `null`) counts as 0, and negatives were
    /// already clamped to 0 by the coercion.
    #[must_use]
    pub fn sum_category_items(items: &Map<String, Value>) -> Amount {
        items.values().map(Amount::from_json).sum()
    }

    /// Builds the donut-chart slices.
    ///
    /// Remaining is floored at zero and zero-value slices are left out, so
    /// the result has between 0 and 4 entries.
    #[must_use]
    pub fn derive_chart_slices(input: &BudgetSnapshot) -> Vec<ChartSlice> {
        let remaining = input.total_amount.saturating_sub(input.planned());

        [
            (SliceKind::Expenses, input.bills),
            (SliceKind::Debt, input.debt),
            (SliceKind::Savings, input.savings),
            (SliceKind::Remaining, remaining),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_zero())
        .map(|(name, value)| ChartSlice {
            name,
            value,
            color: name.color(),
            percentage: whole_percent(value, input.total_amount),
        })
        .collect()
    }

    /// Signed and floored remaining amounts.
    #[must_use]
    pub fn remaining(input: &BudgetSnapshot) -> RemainingView {
        let signed = input.signed_remaining();
        RemainingView {
            signed,
            floored: Amount::new(signed),
            over_allocated: signed < Decimal::ZERO,
        }
    }
}

/// `round(value / divisor * 100)` clamped to `0..=100`; 0 for a zero divisor.
fn whole_percent(value: Amount, divisor: Amount) -> u8 {
    if divisor.is_zero() {
        return 0;
    }
    value
        .value()
        .checked_div(divisor.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(100, |pct| {
            pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .min(Decimal::ONE_HUNDRED)
                .to_u8()
                .unwrap_or(100)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn snapshot(total: Decimal, bills: Decimal, debt: Decimal, savings: Decimal) -> BudgetSnapshot {
        BudgetSnapshot {
            total_amount: Amount::new(total),
            bills: Amount::new(bills),
            debt: Amount::new(debt),
            savings: Amount::new(savings),
        }
    }

    fn values(summary: &BudgetSummary) -> Vec<Decimal> {
        summary.parts.iter().map(|p| p.value.value()).collect()
    }

    #[test]
    fn test_summary_parts_in_order() {
        let summary =
            BudgetAggregator::compute_summary(&snapshot(dec!(1000), dec!(300), dec!(200), dec!(100)));

        let names: Vec<&str> = summary.parts.iter().map(|p| p.name.name()).collect();
        assert_eq!(names, ["Bills", "Debt", "Savings", "Left"]);
        assert_eq!(values(&summary), [dec!(300), dec!(200), dec!(100), dec!(400)]);
        let pcts: Vec<u8> = summary.parts.iter().map(|p| p.pct).collect();
        assert_eq!(pcts, [30, 20, 10, 40]);
        assert_eq!(summary.left.value(), dec!(400));
    }

    #[test]
    fn test_summary_left_floors_at_zero() {
        let summary = BudgetAggregator::compute_summary(&snapshot(
            dec!(10000),
            dec!(6000),
            dec!(3000),
            dec!(3000),
        ));
        assert_eq!(summary.left, Amount::ZERO);
        assert_eq!(summary.parts[3].pct, 0);
    }

    #[test]
    fn test_summary_zero_total_has_zero_percentages() {
        let summary =
            BudgetAggregator::compute_summary(&snapshot(dec!(0), dec!(50), dec!(0), dec!(25)));
        assert!(summary.parts.iter().all(|p| p.pct == 0));
        assert_eq!(values(&summary), [dec!(50), dec!(0), dec!(25), dec!(0)]);
    }

    #[test]
    fn test_summary_rounding_is_independent() {
        // 1/3 each: 33 + 33 + 33 = 99, and that's fine.
        let summary =
            BudgetAggregator::compute_summary(&snapshot(dec!(3), dec!(1), dec!(1), dec!(1)));
        let pcts: Vec<u8> = summary.parts.iter().map(|p| p.pct).collect();
        assert_eq!(pcts, [33, 33, 33, 0]);
    }

    #[rstest]
    #[case(dec!(1000), dec!(5), 1)] // 0.5 rounds up
    #[case(dec!(1000), dec!(4), 0)]
    #[case(dec!(1000), dec!(125), 13)] // 12.5 rounds up
    #[case(dec!(200), dec!(1), 1)] // 0.5 rounds up
    fn test_summary_rounds_half_up(#[case] total: Decimal, #[case] bills: Decimal, #[case] pct: u8) {
        let summary = BudgetAggregator::compute_summary(&snapshot(total, bills, dec!(0), dec!(0)));
        assert_eq!(summary.parts[0].pct, pct);
    }

    #[test]
    fn test_summary_small_total_uses_safe_divisor() {
        // max(0.5, 1) = 1, so 0.25 is 25%.
        let summary =
            BudgetAggregator::compute_summary(&snapshot(dec!(0.5), dec!(0.25), dec!(0), dec!(0)));
        assert_eq!(summary.parts[0].pct, 25);
    }

    #[test]
    fn test_summary_single_category_over_total_is_capped() {
        let summary =
            BudgetAggregator::compute_summary(&snapshot(dec!(1000), dec!(2500), dec!(0), dec!(0)));
        assert_eq!(summary.parts[0].pct, 100);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let input = snapshot(dec!(4321), dec!(1234), dec!(99.5), dec!(10));
        assert_eq!(
            BudgetAggregator::compute_summary(&input),
            BudgetAggregator::compute_summary(&input)
        );
    }

    #[test]
    fn test_summary_from_loose_json() {
        let input: BudgetSnapshot =
            serde_json::from_value(json!({"totalAmount": "1000", "bills": null, "debt": "x"}))
                .unwrap();
        let summary = BudgetAggregator::compute_summary(&input);
        assert_eq!(summary.left.value(), dec!(1000));
        assert_eq!(summary.parts[3].pct, 100);
    }

    #[test]
    fn test_sum_category_items_coerces() {
        let items = json!({"a": 100, "b": "50", "c": null});
        let Value::Object(map) = items else {
            unreachable!()
        };
        // `d` is simply absent, the JSON form of `undefined`.
        assert_eq!(BudgetAggregator::sum_category_items(&map).value(), dec!(150));
    }

    #[test]
    fn test_sum_category_items_ignores_garbage_and_negatives() {
        let items = json!({"a": "ten", "b": -40, "c": [1], "d": 12.5});
        let Value::Object(map) = items else {
            unreachable!()
        };
        assert_eq!(BudgetAggregator::sum_category_items(&map).value(), dec!(12.5));
        assert_eq!(BudgetAggregator::sum_category_items(&Map::new()), Amount::ZERO);
    }

    #[test]
    fn test_chart_slices_full_allocation() {
        let slices = BudgetAggregator::derive_chart_slices(&snapshot(
            dec!(1000),
            dec!(300),
            dec!(200),
            dec!(100),
        ));

        assert_eq!(slices.len(), 4);
        let total: Amount = slices.iter().map(|s| s.value).sum();
        assert_eq!(total.value(), dec!(1000));
        assert_eq!(slices[3].name, SliceKind::Remaining);
        assert_eq!(slices[3].value.value(), dec!(400));
        assert_eq!(slices[3].percentage, 40);
        assert_eq!(slices[0].color, "#a855f7");
    }

    #[test]
    fn test_chart_slices_skip_empty_categories() {
        let slices =
            BudgetAggregator::derive_chart_slices(&snapshot(dec!(1000), dec!(0), dec!(0), dec!(0)));

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].name, SliceKind::Remaining);
        assert_eq!(slices[0].value.value(), dec!(1000));
        assert_eq!(slices[0].percentage, 100);
    }

    #[test]
    fn test_chart_slices_never_draw_negative_remaining() {
        let slices = BudgetAggregator::derive_chart_slices(&snapshot(
            dec!(10000),
            dec!(6000),
            dec!(3000),
            dec!(3000),
        ));
        assert_eq!(slices.len(), 3);
        assert!(slices.iter().all(|s| s.name != SliceKind::Remaining));
    }

    #[test]
    fn test_chart_slices_zero_total() {
        let slices =
            BudgetAggregator::derive_chart_slices(&snapshot(dec!(0), dec!(500), dec!(0), dec!(0)));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].percentage, 0);

        assert!(BudgetAggregator::derive_chart_slices(&BudgetSnapshot::default()).is_empty());
    }

    #[test]
    fn test_remaining_over_allocation() {
        let view = BudgetAggregator::remaining(&snapshot(
            dec!(10000),
            dec!(6000),
            dec!(3000),
            dec!(3000),
        ));
        assert_eq!(view.signed, dec!(-2000));
        assert_eq!(view.floored, Amount::ZERO);
        assert!(view.over_allocated);
        assert_eq!(view.magnitude(), dec!(2000));
    }

    #[test]
    fn test_remaining_exactly_allocated_is_not_a_warning() {
        let view =
            BudgetAggregator::remaining(&snapshot(dec!(600), dec!(300), dec!(200), dec!(100)));
        assert_eq!(view.signed, dec!(0));
        assert!(!view.over_allocated);
    }

    #[test]
    fn test_whole_percent_survives_extreme_ratios() {
        let tiny = Amount::new(dec!(0.0000000000000000000000000001));
        assert_eq!(whole_percent(Amount::new(Decimal::MAX), tiny), 100);
        assert_eq!(whole_percent(Amount::new(dec!(5)), Amount::ZERO), 0);
    }
}
