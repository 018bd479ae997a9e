//! Budget categories and their closed sets of sub-items.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use budgetly_shared::Amount;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::types::{BudgetPatch, BudgetRecord};

/// A top-level allocation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Recurring expenses, stored as `bills` on the wire.
    Expenses,
    /// Debt repayments.
    Debt,
    /// Savings contributions.
    Savings,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 3] = [Self::Expenses, Self::Debt, Self::Savings];

    /// Record field holding the category total.
    #[must_use]
    pub const fn total_field(self) -> &'static str {
        match self {
            Self::Expenses => "bills",
            Self::Debt => "debt",
            Self::Savings => "savings",
        }
    }

    /// Record field holding the sub-item breakdown.
    #[must_use]
    pub const fn items_field(self) -> &'static str {
        match self {
            Self::Expenses => "billItems",
            Self::Debt => "debtItems",
            Self::Savings => "savingsItems",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expenses => "Expenses",
            Self::Debt => "Debt",
            Self::Savings => "Savings",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expenses" | "bills" => Ok(Self::Expenses),
            "debt" => Ok(Self::Debt),
            "savings" => Ok(Self::Savings),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// A named line within a category's breakdown.
///
/// Each implementor is a closed enumeration and knows which record fields it
/// owns, which lets one generic editor serve every category.
pub trait SubItem: Copy + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// The category these items break down.
    const CATEGORY: Category;

    /// Every item, in display order.
    const ALL: &'static [Self];

    /// camelCase key used on the wire.
    fn key(self) -> &'static str;

    /// Human-readable label.
    fn label(self) -> &'static str;

    /// Looks up an item by its wire key.
    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|item| item.key() == key)
    }

    /// The record's breakdown for this category, if one has been saved.
    fn items_of(record: &BudgetRecord) -> Option<&ItemBreakdown<Self>>;

    /// Writes this category's total and breakdown into a patch.
    fn place(patch: &mut BudgetPatch, items: ItemBreakdown<Self>);
}

macro_rules! sub_item {
    (
        $(#[$meta:meta])*
        $name:ident: $category:ident, $field:ident, $total:ident {
            $($variant:ident => $key:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl SubItem for $name {
            const CATEGORY: Category = Category::$category;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn key(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn items_of(record: &BudgetRecord) -> Option<&ItemBreakdown<Self>> {
                record.$field.as_ref()
            }

            fn place(patch: &mut BudgetPatch, items: ItemBreakdown<Self>) {
                patch.$total = Some(items.total());
                patch.$field = Some(items);
            }
        }
    };
}

sub_item! {
    /// Lines of the Expenses category.
    BillItem: Expenses, bill_items, bills {
        Rent => "rent", "Rent/Mortgage";
        Utilities => "utilities", "Utilities (Electricity, Water)";
        Internet => "internet", "Internet & Phone";
        Subscriptions => "subscriptions", "Subscriptions";
        Insurance => "insurance", "Insurance Premiums";
    }
}

sub_item! {
    /// Lines of the Debt category.
    DebtItem: Debt, debt_items, debt {
        CreditCard => "creditCard", "Credit Card Debt";
        PersonalLoan => "personalLoan", "Personal Loans";
        CarLoan => "carLoan", "Car Loans";
        StudentLoan => "studentLoan", "Student Loans";
        HomeLoan => "homeLoan", "Home Loans/Mortgage";
    }
}

sub_item! {
    /// Lines of the Savings category.
    SavingsItem: Savings, savings_items, savings {
        EmergencyFund => "emergencyFund", "Emergency Fund";
        Retirement => "retirement", "Retirement Savings";
        Investment => "investment", "Investment Accounts";
        FixedDeposit => "fixedDeposit", "Fixed Deposits";
        GoalBased => "goalBased", "Goal-based Savings";
    }
}

/// A category breakdown with every sub-item present.
///
/// Missing keys read as zero and unknown keys are dropped. On the wire this
/// is a JSON object keyed by [`SubItem::key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemBreakdown<K: SubItem> {
    amounts: BTreeMap<K, Amount>,
}

impl<K: SubItem> Default for ItemBreakdown<K> {
    fn default() -> Self {
        Self {
            amounts: K::ALL.iter().map(|&item| (item, Amount::ZERO)).collect(),
        }
    }
}

impl<K: SubItem> ItemBreakdown<K> {
    /// Builds a breakdown from a loosely-typed JSON object.
    #[must_use]
    pub fn from_loose(map: &Map<String, Value>) -> Self {
        Self {
            amounts: K::ALL
                .iter()
                .map(|&item| {
                    let amount = map.get(item.key()).map_or(Amount::ZERO, Amount::from_json);
                    (item, amount)
                })
                .collect(),
        }
    }

    /// Amount for one item.
    #[must_use]
    pub fn get(&self, item: K) -> Amount {
        self.amounts.get(&item).copied().unwrap_or_default()
    }

    /// Sets one item.
    pub fn set(&mut self, item: K, amount: Amount) {
        self.amounts.insert(item, amount);
    }

    /// Sum of every item.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.amounts.values().sum()
    }

    /// Items with their amounts, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Amount)> + '_ {
        self.amounts.iter().map(|(&item, &amount)| (item, amount))
    }
}

impl<K: SubItem> FromIterator<(K, Amount)> for ItemBreakdown<K> {
    fn from_iter<I: IntoIterator<Item = (K, Amount)>>(iter: I) -> Self {
        let mut breakdown = Self::default();
        for (item, amount) in iter {
            breakdown.set(item, amount);
        }
        breakdown
    }
}

impl<K: SubItem> Serialize for ItemBreakdown<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.amounts.len()))?;
        for (item, amount) in self.iter() {
            map.serialize_entry(item.key(), &amount)?;
        }
        map.end()
    }
}

impl<'de, K: SubItem> Deserialize<'de> for ItemBreakdown<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_loose(&map)),
            _ => Ok(Self::default()),
        }
    }
}
