//! The dashboard view: one record, its load state, and the summaries the
//! overview renders from it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use budgetly_core::budget::{
    BudgetAggregator, BudgetPatch, BudgetRecord, BudgetSnapshot, BudgetSummary, ChartSlice,
    RemainingView,
};
use budgetly_shared::{Amount, AppResult, BudgetPeriod};
use tracing::{debug, warn};

use crate::store::BudgetStore;

/// Where the view is in loading its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting on the first response for the current period.
    Loading,
    /// The record reflects the store.
    Ready,
    /// The last load failed; the last-known-good record is still shown.
    Failed,
}

/// Whether a finished load was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response belonged to the latest request and was applied.
    Applied,
    /// A newer request had been issued; the response was discarded.
    Superseded,
}

#[derive(Debug)]
struct ViewState {
    period: BudgetPeriod,
    record: BudgetRecord,
    load_state: LoadState,
    error: Option<String>,
    latest_request: u64,
    /// Bumped whenever `record` is replaced or edited.
    revision: u64,
}

/// Holds the record for the selected period.
///
/// State sits behind a mutex that is never held across an `.await`.
pub struct BudgetView {
    store: Arc<dyn BudgetStore>,
    state: Mutex<ViewState>,
}

impl BudgetView {
    /// Creates a view for `period`. Nothing is fetched until [`Self::load`].
    #[must_use]
    pub fn new(store: Arc<dyn BudgetStore>, period: BudgetPeriod) -> Self {
        Self {
            store,
            state: Mutex::new(ViewState {
                period,
                record: BudgetRecord::empty(period),
                load_state: LoadState::Loading,
                error: None,
                latest_request: 0,
                revision: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches to `period` and fetches its record.
    ///
    /// Only the most recently issued load is applied; a response that
    /// arrives after a newer request was issued is dropped.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure of the latest request. The previous record
    /// stays in place and an inline error is recorded.
    pub async fn load(&self, period: BudgetPeriod) -> AppResult<LoadOutcome> {
        let request = {
            let mut state = self.state();
            state.latest_request += 1;
            state.period = period;
            state.load_state = LoadState::Loading;
            state.latest_request
        };

        let result = self.store.fetch(period).await;

        let mut state = self.state();
        if state.latest_request != request {
            debug!(%period, request, "Discarding superseded budget response");
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(record) => {
                state.record = record;
                state.revision += 1;
                state.load_state = LoadState::Ready;
                state.error = None;
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                warn!(%period, error = %e, "Keeping last-known-good budget");
                state.load_state = LoadState::Failed;
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Re-fetches the current period.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub async fn refresh(&self) -> AppResult<LoadOutcome> {
        let period = self.period();
        self.load(period).await
    }

    /// Sets the total budget: applied locally at once, then persisted.
    ///
    /// The server's record replaces the local one when it is echoed back.
    /// A reply is applied only while nothing newer (another write or a load)
    /// has touched the record since this write was issued.
    ///
    /// # Errors
    ///
    /// Returns the save failure after recording an inline error. The prior
    /// total is restored unless newer state has landed in the meantime.
    pub async fn set_total_amount(&self, amount: Amount) -> AppResult<()> {
        let (prior_total, period, revision) = {
            let mut state = self.state();
            let prior_total = state.record.total_amount;
            state.record.total_amount = amount;
            state.revision += 1;
            (prior_total, state.period, state.revision)
        };

        let result = self
            .store
            .save(&BudgetPatch::total_amount(period, amount))
            .await;

        let mut state = self.state();
        let untouched = state.period == period && state.revision == revision;
        match result {
            Ok(echoed) => {
                if let (Some(record), true) = (echoed, untouched) {
                    state.record = record;
                    state.revision += 1;
                }
                state.error = None;
                Ok(())
            }
            Err(e) => {
                if untouched && state.record.total_amount == amount {
                    warn!(%period, error = %e, "Reverting total budget");
                    state.record.total_amount = prior_total;
                } else {
                    warn!(%period, error = %e, "Total budget write failed; newer state kept");
                }
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// The selected period.
    #[must_use]
    pub fn period(&self) -> BudgetPeriod {
        self.state().period
    }

    /// Copy of the displayed record.
    #[must_use]
    pub fn record(&self) -> BudgetRecord {
        self.state().record.clone()
    }

    /// Current load state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.state().load_state
    }

    /// The inline error, if the last operation failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Dismisses the inline error.
    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Headline numbers, also the assistant's `budgetData`.
    #[must_use]
    pub fn snapshot(&self) -> BudgetSnapshot {
        self.state().record.snapshot()
    }

    /// Breakdown list.
    #[must_use]
    pub fn summary(&self) -> BudgetSummary {
        BudgetAggregator::compute_summary(&self.snapshot())
    }

    /// Donut-chart slices.
    #[must_use]
    pub fn chart_slices(&self) -> Vec<ChartSlice> {
        BudgetAggregator::derive_chart_slices(&self.snapshot())
    }

    /// Signed and floored remaining.
    #[must_use]
    pub fn remaining(&self) -> RemainingView {
        BudgetAggregator::remaining(&self.snapshot())
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
