//! Loan list and customer loan list controllers

use std::sync::Arc;

use crate::error::StateError;
use crate::loan::{ListLoansQuery, LoanStatus, PaymentFrequency};
use crate::state::{LoanListState, LoanStore};

/// User-selectable list filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilters {
    pub status: Option<LoanStatus>,
    pub payment_frequency: Option<PaymentFrequency>,
}

impl LoanFilters {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_frequency.is_none()
    }
}

/// Drives the loan list: filters, paging and error recovery.
///
/// Any filter change starts over at page 1, which replaces the list.
pub struct LoanListView {
    store: Arc<LoanStore>,
    filters: LoanFilters,
    customer_id: Option<String>,
    reset_filters_on_error: bool,
}

impl LoanListView {
    pub fn new(store: Arc<LoanStore>, reset_filters_on_error: bool) -> Self {
        Self {
            store,
            filters: LoanFilters::default(),
            customer_id: None,
            reset_filters_on_error,
        }
    }

    /// List pinned to one customer; clearing filters keeps the pin
    pub fn for_customer(
        store: Arc<LoanStore>,
        customer_id: impl Into<String>,
        reset_filters_on_error: bool,
    ) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::new(store, reset_filters_on_error)
        }
    }

    pub fn filters(&self) -> &LoanFilters {
        &self.filters
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub async fn state(&self) -> LoanListState {
        self.store.list().await
    }

    fn query(&self, page: u32) -> ListLoansQuery {
        ListLoansQuery {
            page,
            limit: self.store.page_size(),
            customer_id: self.customer_id.clone(),
            status: self.filters.status,
            payment_frequency: self.filters.payment_frequency,
        }
    }

    /// Load page 1 with the current filters
    pub async fn load(&mut self) -> Result<(), StateError> {
        self.fetch(self.query(1)).await
    }

    pub async fn set_status_filter(&mut self, status: Option<LoanStatus>) -> Result<(), StateError> {
        self.filters.status = status;
        self.load().await
    }

    pub async fn set_frequency_filter(
        &mut self,
        payment_frequency: Option<PaymentFrequency>,
    ) -> Result<(), StateError> {
        self.filters.payment_frequency = payment_frequency;
        self.load().await
    }

    pub async fn clear_filters(&mut self) -> Result<(), StateError> {
        self.filters = LoanFilters::default();
        self.load().await
    }

    /// Append the next page of the list currently shown.
    ///
    /// Pages continue from the filters the shown items were loaded with,
    /// which differ from `filters()` after a failed filter change. Returns
    /// `Ok(false)` when nothing was requested.
    pub async fn load_more(&mut self) -> Result<bool, StateError> {
        let had_items = self.has_items().await;
        let result = self.store.fetch_next_page().await;
        self.recover(had_items, &result);
        result
    }

    /// Re-dispatch the request that last failed.
    ///
    /// A failed next page is repeated as sent. A failed first page is rebuilt
    /// from the current filters and customer.
    pub async fn retry(&mut self) -> Result<(), StateError> {
        let query = match self.store.list().await.query {
            Some(query) if query.page > 1 => query,
            _ => self.query(1),
        };
        self.fetch(query).await
    }

    async fn fetch(&mut self, query: ListLoansQuery) -> Result<(), StateError> {
        let had_items = self.has_items().await;
        let result = self.store.fetch_loans(query).await;
        self.recover(had_items, &result);
        result
    }

    async fn has_items(&self) -> bool {
        !self.store.list().await.items.is_empty()
    }

    /// Drop the filters after a failure that left earlier data on screen
    fn recover<T>(&mut self, had_items: bool, result: &Result<T, StateError>) {
        if result.is_err() && had_items && self.reset_filters_on_error && !self.filters.is_empty() {
            tracing::info!(filters = ?self.filters, "Clearing loan filters after failed fetch");
            self.filters = LoanFilters::default();
        }
    }
}
