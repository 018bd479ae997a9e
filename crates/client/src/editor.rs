//! Category edit flow: load one category's breakdown, edit it, save it.

use std::fmt;
use std::sync::Arc;

use budgetly_core::budget::{BudgetRecord, CategoryEditor, SubItem};
use budgetly_shared::{AppResult, BudgetPeriod};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::store::BudgetStore;

/// One open edit of one category for one period.
///
/// A save touches only this category; the other categories are neither read
/// back nor checked against the total budget.
pub struct CategoryEditSession<K: SubItem> {
    store: Arc<dyn BudgetStore>,
    period: BudgetPeriod,
    editor: CategoryEditor<K>,
}

impl<K: SubItem> fmt::Debug for CategoryEditSession<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryEditSession")
            .field("period", &self.period)
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

impl<K: SubItem> CategoryEditSession<K> {
    /// Fetches the period's record and starts editing its `K` breakdown.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure.
    pub async fn open(store: Arc<dyn BudgetStore>, period: BudgetPeriod) -> AppResult<Self> {
        let record = store.fetch(period).await?;
        Ok(Self {
            editor: CategoryEditor::from_record(&record),
            store,
            period,
        })
    }

    /// The period being edited.
    #[must_use]
    pub const fn period(&self) -> BudgetPeriod {
        self.period
    }

    /// The working breakdown.
    #[must_use]
    pub const fn editor(&self) -> &CategoryEditor<K> {
        &self.editor
    }

    /// Mutable access to the working breakdown.
    pub const fn editor_mut(&mut self) -> &mut CategoryEditor<K> {
        &mut self.editor
    }

    /// Persists the category total and breakdown.
    ///
    /// # Errors
    ///
    /// Returns the store failure unchanged. Nothing is retried.
    pub async fn save(&self) -> AppResult<Option<BudgetRecord>> {
        let patch = self.editor.to_patch(self.period);
        let category = K::CATEGORY;
        match self.store.save(&patch).await {
            Ok(record) => {
                info!(%category, period = %self.period, total = %self.editor.total(), "Category saved");
                Ok(record)
            }
            Err(e) => {
                warn!(%category, period = %self.period, error = %e, "Category save failed");
                Err(e)
            }
        }
    }

    /// Runs [`Self::save`] on the runtime and returns at once.
    ///
    /// The write completes even if the handle is dropped, so leaving the
    /// edit view never cancels an in-flight save.
    #[must_use = "dropping the handle detaches the save; await it to observe failures"]
    pub fn save_detached(self) -> JoinHandle<AppResult<Option<BudgetRecord>>> {
        tokio::spawn(async move { self.save().await })
    }
}
