//! Client-side checks run before a repayment is sent to the server

use chrono::NaiveDate;
use thiserror::Error;

use crate::loan::{PaymentMethod, PaymentSubmission, Repayment, RepaymentStatus};

/// Reasons a payment is refused before any request is issued
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentValidationError {
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Amount must be greater than 0")]
    NotPositive,

    #[error("Amount {amount:.2} exceeds the remaining balance of {ceiling:.2}")]
    ExceedsRemaining { amount: f64, ceiling: f64 },

    #[error("Amount {amount:.2} exceeds the installment total of {ceiling:.2}")]
    ExceedsTotal { amount: f64, ceiling: f64 },

    #[error("Installment {0} is already paid")]
    AlreadyPaid(u32),
}

/// Largest amount that may be paid against an installment.
///
/// `None` for a paid installment.
pub fn payment_ceiling(repayment: &Repayment) -> Option<f64> {
    match repayment.status {
        RepaymentStatus::Paid => None,
        RepaymentStatus::Partial => Some(repayment.remaining_amount()),
        RepaymentStatus::Pending | RepaymentStatus::Overdue => Some(repayment.total_amount),
    }
}

/// Check `amount` against the installment it is meant for
pub fn validate_payment_amount(
    repayment: &Repayment,
    amount: f64,
) -> Result<(), PaymentValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentValidationError::NotPositive);
    }

    let ceiling = payment_ceiling(repayment)
        .ok_or(PaymentValidationError::AlreadyPaid(repayment.installment_number))?;

    // Compared in cents so 33.33 + 66.67 style inputs are not refused.
    if to_cents(amount) > to_cents(ceiling) {
        return Err(match repayment.status {
            RepaymentStatus::Partial => PaymentValidationError::ExceedsRemaining { amount, ceiling },
            _ => PaymentValidationError::ExceedsTotal { amount, ceiling },
        });
    }

    Ok(())
}

/// Parse a user-entered amount such as `"1,250.50"`
pub fn parse_amount(input: &str) -> Result<f64, PaymentValidationError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| PaymentValidationError::InvalidAmount(input.trim().to_string()))
}

/// Validate and build the payload for paying `amount` against `repayment`
pub fn build_submission(
    repayment: &Repayment,
    amount: f64,
    payment_date: NaiveDate,
    payment_method: PaymentMethod,
    notes: Option<String>,
) -> Result<PaymentSubmission, PaymentValidationError> {
    validate_payment_amount(repayment, amount)?;

    Ok(PaymentSubmission {
        loan_id: repayment.loan_id.clone(),
        installment_number: repayment.installment_number,
        amount_paid: amount,
        payment_date,
        notes: notes.filter(|n| !n.trim().is_empty()),
        payment_method,
        repayment_id: repayment.id.clone(),
    })
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
