//! Payment history of the selected loan

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::loan::{Repayment, RepaymentStatus};
use crate::state::LoanStore;

/// One line of the history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub repayment: Repayment,
    pub effective_status: RepaymentStatus,
    pub remaining: f64,
}

/// Totals over a repayment schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total_due: f64,
    pub total_paid: f64,
    pub remaining: f64,
    pub paid_count: usize,
    pub overdue_count: usize,
    /// Earliest installment that is not paid
    pub next_due: Option<u32>,
}

impl ScheduleSummary {
    pub fn from_schedule(schedule: &[Repayment], today: NaiveDate) -> Self {
        let mut summary = ScheduleSummary::default();
        let mut next_due: Option<&Repayment> = None;

        for repayment in schedule {
            summary.total_due += repayment.total_amount;
            summary.total_paid += repayment.amount_paid;
            summary.remaining += repayment.remaining_amount();

            match repayment.effective_status(today) {
                RepaymentStatus::Paid => summary.paid_count += 1,
                status => {
                    if status == RepaymentStatus::Overdue {
                        summary.overdue_count += 1;
                    }
                    if next_due.map_or(true, |n| repayment.due_date < n.due_date) {
                        next_due = Some(repayment);
                    }
                }
            }
        }

        summary.next_due = next_due.map(|r| r.installment_number);
        summary
    }

    /// Share of the schedule already paid, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.total_due <= 0.0 {
            0.0
        } else {
            (self.total_paid / self.total_due).clamp(0.0, 1.0)
        }
    }
}

/// Rows for `schedule` ordered by due date, optionally limited to one
/// effective status
pub fn history_rows(
    schedule: &[Repayment],
    filter: Option<RepaymentStatus>,
    today: NaiveDate,
) -> Vec<HistoryRow> {
    let mut rows: Vec<HistoryRow> = schedule
        .iter()
        .map(|repayment| HistoryRow {
            effective_status: repayment.effective_status(today),
            remaining: repayment.remaining_amount(),
            repayment: repayment.clone(),
        })
        .filter(|row| filter.map_or(true, |status| row.effective_status == status))
        .collect();

    rows.sort_by(|a, b| {
        a.repayment
            .due_date
            .cmp(&b.repayment.due_date)
            .then(a.repayment.installment_number.cmp(&b.repayment.installment_number))
    });
    rows
}

/// Browses the schedule of the loan held in the store
pub struct PaymentHistoryView {
    store: Arc<LoanStore>,
    status_filter: Option<RepaymentStatus>,
}

impl PaymentHistoryView {
    pub fn new(store: Arc<LoanStore>) -> Self {
        Self {
            store,
            status_filter: None,
        }
    }

    pub fn status_filter(&self) -> Option<RepaymentStatus> {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, status: Option<RepaymentStatus>) {
        self.status_filter = status;
    }

    pub async fn rows(&self, today: NaiveDate) -> Vec<HistoryRow> {
        let selected = self.store.selected().await;
        history_rows(&selected.schedule, self.status_filter, today)
    }

    pub async fn summary(&self, today: NaiveDate) -> ScheduleSummary {
        let selected = self.store.selected().await;
        ScheduleSummary::from_schedule(&selected.schedule, today)
    }
}
