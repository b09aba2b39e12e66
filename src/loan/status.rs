//! Read-time repayment status
//!
//! The server's stored status can lag behind the calendar. Views display the
//! effective status computed here; the stored record is never modified.

use chrono::{Local, NaiveDate};

use super::model::{Repayment, RepaymentStatus};

/// Effective status of an installment on `today`.
///
/// `PAID` stays `PAID`. Anything else whose due date is strictly before
/// `today` is `OVERDUE`. Otherwise the stored status is returned unchanged.
pub fn effective_status(repayment: &Repayment, today: NaiveDate) -> RepaymentStatus {
    if repayment.status == RepaymentStatus::Paid {
        RepaymentStatus::Paid
    } else if today > repayment.due_date {
        RepaymentStatus::Overdue
    } else {
        repayment.status
    }
}

/// The local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Repayment {
    /// See [`effective_status`]
    pub fn effective_status(&self, today: NaiveDate) -> RepaymentStatus {
        effective_status(self, today)
    }

    /// Whether the installment counts as overdue on `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.effective_status(today) == RepaymentStatus::Overdue
    }
}
