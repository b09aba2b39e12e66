//! Loan detail controller

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use super::payment_history::ScheduleSummary;
use crate::error::StateError;
use crate::loan::{Loan, Repayment};
use crate::state::{LoanStore, SingleLoanState};

/// What the detail screen shows once a loan has loaded
#[derive(Debug, Clone, PartialEq)]
pub struct LoanOverview {
    pub loan: Loan,
    pub outstanding: f64,
    pub schedule: ScheduleSummary,
}

/// Opens one loan and tracks which installments are expanded
pub struct LoanDetailView {
    store: Arc<LoanStore>,
    loan_id: String,
    expanded: BTreeSet<u32>,
}

impl LoanDetailView {
    pub fn new(store: Arc<LoanStore>, loan_id: impl Into<String>) -> Self {
        Self {
            store,
            loan_id: loan_id.into(),
            expanded: BTreeSet::new(),
        }
    }

    pub fn loan_id(&self) -> &str {
        &self.loan_id
    }

    /// Fetch the loan and its schedule
    pub async fn open(&mut self) -> Result<(), StateError> {
        self.expanded.clear();
        self.store.fetch_loan(&self.loan_id).await
    }

    /// Same request again, keeping expanded panels
    pub async fn retry(&self) -> Result<(), StateError> {
        self.store.fetch_loan(&self.loan_id).await
    }

    pub async fn state(&self) -> SingleLoanState {
        self.store.selected().await
    }

    /// Overview of the loan, if the store holds this loan
    pub async fn overview(&self, today: NaiveDate) -> Option<LoanOverview> {
        let selected = self.store.selected().await;
        let loan = selected.loan.filter(|l| l.id == self.loan_id)?;
        Some(LoanOverview {
            outstanding: loan.outstanding_balance(),
            schedule: ScheduleSummary::from_schedule(&selected.schedule, today),
            loan,
        })
    }

    /// Installment `number` of this loan, for opening the payment form
    pub async fn installment(&self, number: u32) -> Option<Repayment> {
        let selected = self.store.selected().await;
        if selected.loan.as_ref().map(|l| l.id.as_str()) != Some(self.loan_id.as_str()) {
            return None;
        }
        selected
            .schedule
            .into_iter()
            .find(|r| r.installment_number == number)
    }

    /// Flip the expanded state of an installment panel; returns the new state
    pub fn toggle_installment(&mut self, number: u32) -> bool {
        if self.expanded.remove(&number) {
            false
        } else {
            self.expanded.insert(number);
            true
        }
    }

    pub fn is_expanded(&self, number: u32) -> bool {
        self.expanded.contains(&number)
    }
}
