//! Plain-text rendering of views.

use budgetly_client::{BudgetView, LoadState};
use budgetly_core::budget::{BudgetSummary, CategoryEditor, ChartSlice, RemainingView, SubItem};
use budgetly_shared::{Amount, BudgetPeriod};

/// Dashboard: total, breakdown list, remaining and chart slices.
pub fn overview(view: &BudgetView) -> String {
    let record = view.record();
    let mut lines = vec![
        header(view.period()),
        format!("Total budget: {}", record.total_amount),
        String::new(),
    ];
    lines.extend(summary_lines(&view.summary()));
    lines.push(String::new());
    lines.push(remaining_line(&view.remaining()));
    lines.extend(chart_lines(&view.chart_slices()));
    if view.load_state() == LoadState::Failed
        && let Some(error) = view.error()
    {
        lines.push(format!("(showing last saved values: {error})"));
    }
    join(lines)
}

/// One category's items and their total.
pub fn breakdown<K: SubItem>(editor: &CategoryEditor<K>) -> String {
    let mut lines = vec![format!("{}:", editor.category())];
    lines.extend(
        editor
            .items()
            .map(|(item, amount)| format!("  {:<32}{:>12}", item.label(), amount.to_string())),
    );
    lines.push(format!("  {:<32}{:>12}", "Total", editor.total().to_string()));
    join(lines)
}

fn header(period: BudgetPeriod) -> String {
    format!("Budget for {period}")
}

fn summary_lines(summary: &BudgetSummary) -> Vec<String> {
    summary
        .parts
        .iter()
        .map(|part| {
            format!(
                "  {:<10}{:>12}  {:>3}%",
                part.name.name(),
                part.value.to_string(),
                part.pct
            )
        })
        .collect()
}

fn remaining_line(remaining: &RemainingView) -> String {
    if remaining.over_allocated {
        format!("Over budget by {}", Amount::new(remaining.magnitude()))
    } else {
        format!("Remaining: {}", remaining.floored)
    }
}

fn chart_lines(slices: &[ChartSlice]) -> Vec<String> {
    if slices.is_empty() {
        return vec!["Chart: nothing to show yet".to_string()];
    }
    let mut lines = vec!["Chart:".to_string()];
    lines.extend(slices.iter().map(|slice| {
        format!(
            "  {:<10}{:>12}  {:>3}%  {}",
            slice.name.name(),
            slice.value.to_string(),
            slice.percentage,
            slice.color
        )
    }));
    lines
}

fn join(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
