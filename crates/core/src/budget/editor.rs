//! Generic category editor.
//!
//! One editor, parameterized by the category's sub-item enumeration, backs
//! the Expenses, Debt and Savings edit flows alike.

use budgetly_shared::{Amount, BudgetPeriod};

use super::category::{Category, ItemBreakdown, SubItem};
use super::types::{BudgetPatch, BudgetRecord};

/// Working copy of one category's breakdown.
///
/// The category total is always derived from the items, so it can never be
/// stale when the edit is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEditor<K: SubItem> {
    items: ItemBreakdown<K>,
}

impl<K: SubItem> Default for CategoryEditor<K> {
    fn default() -> Self {
        Self {
            items: ItemBreakdown::default(),
        }
    }
}

impl<K: SubItem> CategoryEditor<K> {
    /// Starts from the record's saved breakdown, or all zeros if the
    /// category has never been broken down.
    #[must_use]
    pub fn from_record(record: &BudgetRecord) -> Self {
        Self {
            items: K::items_of(record).cloned().unwrap_or_default(),
        }
    }

    /// The category being edited.
    #[must_use]
    pub const fn category(&self) -> Category {
        K::CATEGORY
    }

    /// Current amount of one item.
    #[must_use]
    pub fn get(&self, item: K) -> Amount {
        self.items.get(item)
    }

    /// Sets one item.
    pub fn set(&mut self, item: K, amount: Amount) {
        self.items.set(item, amount);
    }

    /// Sets one item from raw form input; non-numeric or negative input is
    /// stored as 0.
    pub fn set_input(&mut self, item: K, input: &str) {
        self.set(item, Amount::parse_lenient(input));
    }

    /// Sum of every item.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.items.total()
    }

    /// Items with their amounts, in display order.
    pub fn items(&self) -> impl Iterator<Item = (K, Amount)> + '_ {
        self.items.iter()
    }

    /// The patch that persists this category: its total, its items and the
    /// period key, nothing else.
    #[must_use]
    pub fn to_patch(&self, period: BudgetPeriod) -> BudgetPatch {
        BudgetPatch::category(period, self.items.clone())
    }
}
