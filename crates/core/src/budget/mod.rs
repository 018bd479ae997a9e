//! Budget records, category breakdowns and the aggregation rules that turn
//! them into summaries and chart data.

pub mod aggregator;
pub mod category;
pub mod editor;
pub mod types;


pub use aggregator::{
    BudgetAggregator, BudgetSummary, ChartSlice, RemainingView, SliceKind, SummaryPart,
    SummaryPartKind,
};
pub use category::{BillItem, Category, DebtItem, ItemBreakdown, SavingsItem, SubItem};
pub use editor::CategoryEditor;
pub use types::{BudgetPatch, BudgetRecord, BudgetSnapshot};
