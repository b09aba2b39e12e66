//! Repayment entry form

use std::sync::Arc;

use chrono::NaiveDate;

use crate::loan::{PaymentMethod, PaymentSubmission, Repayment};
use crate::payment::{build_submission, parse_amount, payment_ceiling, PaymentValidationError};
use crate::state::{LoanStore, PaymentReceipt};

/// What the caller should do after `submit`
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Payment recorded; leave the form
    NavigateBack(PaymentReceipt),
    /// Stay on the form and show `message`
    Stay { message: String },
}

/// Form state for paying one installment
pub struct PaymentForm {
    store: Arc<LoanStore>,
    repayment: Repayment,
    amount_input: String,
    payment_date: NaiveDate,
    method: PaymentMethod,
    notes: String,
    error: Option<String>,
}

impl PaymentForm {
    /// Form prefilled with the largest acceptable amount
    pub fn new(store: Arc<LoanStore>, repayment: Repayment, today: NaiveDate) -> Self {
        let amount_input = payment_ceiling(&repayment)
            .map(|c| format!("{:.2}", c))
            .unwrap_or_default();
        Self {
            store,
            repayment,
            amount_input,
            payment_date: today,
            method: PaymentMethod::default(),
            notes: String::new(),
            error: None,
        }
    }

    pub fn repayment(&self) -> &Repayment {
        &self.repayment
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn ceiling(&self) -> Option<f64> {
        payment_ceiling(&self.repayment)
    }

    /// Message from the last failed validation or submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_amount(&mut self, input: impl Into<String>) {
        self.amount_input = input.into();
        self.error = None;
    }

    pub fn set_payment_date(&mut self, date: NaiveDate) {
        self.payment_date = date;
    }

    pub fn set_method(&mut self, method: PaymentMethod) {
        self.method = method;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Build the submission the form would send
    pub fn validate(&self) -> Result<PaymentSubmission, PaymentValidationError> {
        let amount = parse_amount(&self.amount_input)?;
        let notes = Some(self.notes.clone());
        build_submission(&self.repayment, amount, self.payment_date, self.method, notes)
    }

    /// Validate, then send.
    ///
    /// Nothing is sent when validation fails. Server messages are shown
    /// exactly as received.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let submission = match self.validate() {
            Ok(submission) => submission,
            Err(e) => return self.stay(e.to_string()),
        };

        match self.store.submit_payment(&self.repayment, submission).await {
            Ok(receipt) => {
                self.error = None;
                SubmitOutcome::NavigateBack(receipt)
            }
            Err(e) => self.stay(e.message),
        }
    }

    fn stay(&mut self, message: String) -> SubmitOutcome {
        self.error = Some(message.clone());
        SubmitOutcome::Stay { message }
    }
}
