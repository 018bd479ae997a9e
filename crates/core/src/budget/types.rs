//! Budget data types.

use budgetly_shared::{Amount, BudgetPeriod};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::category::{BillItem, Category, DebtItem, ItemBreakdown, SavingsItem, SubItem};

/// The allocation record for one user and one (month, year).
///
/// Every field defaults when absent, so a missing record and an empty JSON
/// object both read as the all-zero record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetRecord {
    /// Declared income/budget for the period.
    pub total_amount: Amount,
    /// Expenses total.
    pub bills: Amount,
    /// Debt total.
    pub debt: Amount,
    /// Savings total.
    pub savings: Amount,
    /// Expenses breakdown; `None` until the category has been edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_items: Option<ItemBreakdown<BillItem>>,
    /// Debt breakdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_items: Option<ItemBreakdown<DebtItem>>,
    /// Savings breakdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_items: Option<ItemBreakdown<SavingsItem>>,
    /// Zero-based month.
    #[serde(deserialize_with = "lenient_int")]
    pub month: u8,
    /// Calendar year.
    #[serde(deserialize_with = "lenient_int")]
    pub year: i32,
}

/// Integers and integral strings are accepted; anything else, or a value out
/// of range for `T`, reads as zero.
fn lenient_int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    let whole = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(whole.and_then(|n| T::try_from(n).ok()).unwrap_or_default())
}

impl BudgetRecord {
    /// The all-zero record for a period, as created on first access.
    #[must_use]
    pub fn empty(period: BudgetPeriod) -> Self {
        Self {
            month: period.month(),
            year: period.year(),
            ..Self::default()
        }
    }

    /// The period key, if the stored month/year are valid.
    #[must_use]
    pub fn period(&self) -> Option<BudgetPeriod> {
        BudgetPeriod::new(self.month, self.year).ok()
    }

    /// Total for one category.
    #[must_use]
    pub const fn category_total(&self, category: Category) -> Amount {
        match category {
            Category::Expenses => self.bills,
            Category::Debt => self.debt,
            Category::Savings => self.savings,
        }
    }

    /// Sum of every category total.
    #[must_use]
    pub fn planned(&self) -> Amount {
        self.bills + self.debt + self.savings
    }

    /// Signed remaining amount; negative when over-allocated.
    #[must_use]
    pub fn signed_remaining(&self) -> Decimal {
        self.snapshot().signed_remaining()
    }

    /// The four headline numbers.
    #[must_use]
    pub const fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            total_amount: self.total_amount,
            bills: self.bills,
            debt: self.debt,
            savings: self.savings,
        }
    }

    /// Recomputes every category total that has a breakdown.
    ///
    /// Categories without a breakdown keep their directly-edited total.
    pub fn reconcile(&mut self) {
        if let Some(items) = &self.bill_items {
            self.bills = items.total();
        }
        if let Some(items) = &self.debt_items {
            self.debt = items.total();
        }
        if let Some(items) = &self.savings_items {
            self.savings = items.total();
        }
    }

    /// Merges a partial update into this record.
    ///
    /// Only fields present in the patch change; the period key is taken from
    /// the patch.
    pub fn apply_patch(&mut self, patch: &BudgetPatch) {
        if let Some(total) = patch.total_amount {
            self.total_amount = total;
        }
        if let Some(bills) = patch.bills {
            self.bills = bills;
        }
        if let Some(items) = &patch.bill_items {
            self.bill_items = Some(items.clone());
        }
        if let Some(debt) = patch.debt {
            self.debt = debt;
        }
        if let Some(items) = &patch.debt_items {
            self.debt_items = Some(items.clone());
        }
        if let Some(savings) = patch.savings {
            self.savings = savings;
        }
        if let Some(items) = &patch.savings_items {
            self.savings_items = Some(items.clone());
        }
        self.month = patch.period.month();
        self.year = patch.period.year();
    }
}

/// A partial update, as sent with `PUT /api/budget`.
///
/// Absent fields are left out of the JSON body entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPatch {
    /// New total budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Amount>,
    /// New expenses total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bills: Option<Amount>,
    /// New expenses breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_items: Option<ItemBreakdown<BillItem>>,
    /// New debt total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<Amount>,
    /// New debt breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_items: Option<ItemBreakdown<DebtItem>>,
    /// New savings total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<Amount>,
    /// New savings breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_items: Option<ItemBreakdown<SavingsItem>>,
    /// Record key.
    #[serde(flatten)]
    pub period: BudgetPeriod,
}

impl BudgetPatch {
    /// An empty patch for a period.
    #[must_use]
    pub const fn new(period: BudgetPeriod) -> Self {
        Self {
            total_amount: None,
            bills: None,
            bill_items: None,
            debt: None,
            debt_items: None,
            savings: None,
            savings_items: None,
            period,
        }
    }

    /// A patch that only changes the total budget.
    #[must_use]
    pub fn total_amount(period: BudgetPeriod, amount: Amount) -> Self {
        let mut patch = Self::new(period);
        patch.total_amount = Some(amount);
        patch
    }

    /// A patch that replaces one category's breakdown and its total.
    #[must_use]
    pub fn category<K: SubItem>(period: BudgetPeriod, items: ItemBreakdown<K>) -> Self {
        let mut patch = Self::new(period);
        K::place(&mut patch, items);
        patch
    }
}

/// The four headline numbers of a record.
///
/// This is the input to the summary computations and the `budgetData`
/// payload sent to the assistant. Deserialization is lenient: absent or
/// non-numeric fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetSnapshot {
    /// Declared total budget.
    pub total_amount: Amount,
    /// Expenses total.
    pub bills: Amount,
    /// Debt total.
    pub debt: Amount,
    /// Savings total.
    pub savings: Amount,
}

impl BudgetSnapshot {
    /// Sum of the three category totals.
    #[must_use]
    pub fn planned(&self) -> Amount {
        self.bills + self.debt + self.savings
    }

    /// `total - bills - debt - savings`, signed.
    #[must_use]
    pub fn signed_remaining(&self) -> Decimal {
        [self.bills, self.debt, self.savings]
            .iter()
            .try_fold(self.total_amount.value(), |acc, part| {
                acc.checked_sub(part.value())
            })
            .unwrap_or(Decimal::MIN)
    }
}

impl From<&BudgetRecord> for BudgetSnapshot {
    fn from(record: &BudgetRecord) -> Self {
        record.snapshot()
    }
}
