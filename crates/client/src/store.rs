//! Budget persistence.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use budgetly_core::budget::{BudgetPatch, BudgetRecord};
use budgetly_shared::{AppError, AppResult, BudgetPeriod};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, read_optional_json};

/// Where budget records live.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Fetches the record for a period. A period that has never been saved
    /// reads as the all-zero record.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure; absence is not an error.
    async fn fetch(&self, period: BudgetPeriod) -> AppResult<BudgetRecord>;

    /// Merges a partial update. Returns the stored record when the backend
    /// echoes it back.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure. Nothing is retried.
    async fn save(&self, patch: &BudgetPatch) -> AppResult<Option<BudgetRecord>>;
}

/// Normalizes a fetched record to the requested period and recomputes
/// category totals from their breakdowns.
fn normalize(mut record: BudgetRecord, period: BudgetPeriod) -> BudgetRecord {
    record.month = period.month();
    record.year = period.year();
    record.reconcile();
    record
}

/// Only an object carrying the period key counts as an echoed record; an
/// acknowledgement such as `{"message": "ok"}` does not.
fn echoed_record(value: Value) -> Option<BudgetRecord> {
    let looks_like_record = value
        .as_object()
        .is_some_and(|obj| obj.contains_key("month") && obj.contains_key("year"));
    if !looks_like_record {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// `GET`/`PUT /api/budget` on the remote backend.
#[derive(Debug, Clone)]
pub struct HttpBudgetStore {
    api: ApiClient,
}

impl HttpBudgetStore {
    /// Creates a store over an existing connection.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl BudgetStore for HttpBudgetStore {
    async fn fetch(&self, period: BudgetPeriod) -> AppResult<BudgetRecord> {
        let request = self.api.request(Method::GET, "/api/budget").query(&[
            ("month", i32::from(period.month())),
            ("year", period.year()),
        ]);

        let response = match self.api.send_authorized(request).await {
            Ok(response) => response,
            Err(AppError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                debug!(%period, "No budget saved yet");
                return Ok(BudgetRecord::empty(period));
            }
            Err(e) => {
                warn!(%period, error_code = e.error_code(), error = %e, "Budget fetch failed");
                return Err(e);
            }
        };

        let record = match read_optional_json(response).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| AppError::Decode(format!("budget record: {e}")))?,
            None => BudgetRecord::empty(period),
        };
        debug!(%period, "Budget fetched");
        Ok(normalize(record, period))
    }

    async fn save(&self, patch: &BudgetPatch) -> AppResult<Option<BudgetRecord>> {
        let request = self.api.request(Method::PUT, "/api/budget").json(patch);

        let response = self.api.send_authorized(request).await.inspect_err(|e| {
            warn!(period = %patch.period, error_code = e.error_code(), error = %e, "Budget save failed");
        })?;
        info!(period = %patch.period, "Budget saved");

        // The write has landed; an unreadable acknowledgement is not a failure.
        let echoed = match read_optional_json(response).await {
            Ok(body) => body.and_then(echoed_record),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable save response");
                None
            }
        };
        Ok(echoed.map(|record| normalize(record, patch.period)))
    }
}

/// Records held in process, created on first access.
#[derive(Debug, Default)]
pub struct InMemoryBudgetStore {
    records: Mutex<HashMap<BudgetPeriod, BudgetRecord>>,
}

impl InMemoryBudgetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces one record.
    pub fn insert(&self, record: BudgetRecord) {
        if let Some(period) = record.period() {
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(period, record);
        }
    }
}

#[async_trait]
impl BudgetStore for InMemoryBudgetStore {
    async fn fetch(&self, period: BudgetPeriod) -> AppResult<BudgetRecord> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .get(&period)
            .cloned()
            .unwrap_or_else(|| BudgetRecord::empty(period)))
    }

    async fn save(&self, patch: &BudgetPatch) -> AppResult<Option<BudgetRecord>> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .entry(patch.period)
            .or_insert_with(|| BudgetRecord::empty(patch.period));
        record.apply_patch(patch);
        Ok(Some(record.clone()))
    }
}
