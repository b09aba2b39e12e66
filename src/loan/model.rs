//! Loan models as exchanged with the loan-servicing API

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Loan status enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Active,
    Completed,
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Active => "active",
            LoanStatus::Completed => "completed",
            LoanStatus::Defaulted => "defaulted",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LoanStatus::Pending),
            "active" => Ok(LoanStatus::Active),
            "completed" => Ok(LoanStatus::Completed),
            "defaulted" => Ok(LoanStatus::Defaulted),
            _ => Err(format!(
                "Invalid loan status: '{}'. Expected: pending, active, completed, or defaulted",
                s
            )),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often installments fall due
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl PaymentFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Daily => "daily",
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(PaymentFrequency::Daily),
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" => Ok(PaymentFrequency::Biweekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            _ => Err(format!(
                "Invalid payment frequency: '{}'. Expected: daily, weekly, biweekly, or monthly",
                s
            )),
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single installment as stored by the server
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepaymentStatus {
    Paid,
    Pending,
    Partial,
    Overdue,
}

impl RepaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepaymentStatus::Paid => "PAID",
            RepaymentStatus::Pending => "PENDING",
            RepaymentStatus::Partial => "PARTIAL",
            RepaymentStatus::Overdue => "OVERDUE",
        }
    }
}

impl FromStr for RepaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PAID" => Ok(RepaymentStatus::Paid),
            "PENDING" => Ok(RepaymentStatus::Pending),
            "PARTIAL" => Ok(RepaymentStatus::Partial),
            "OVERDUE" => Ok(RepaymentStatus::Overdue),
            _ => Err(format!(
                "Invalid repayment status: '{}'. Expected: PAID, PENDING, PARTIAL, or OVERDUE",
                s
            )),
        }
    }
}

impl fmt::Display for RepaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a repayment was collected
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    MobileMoney,
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "cheque" => Ok(PaymentMethod::Cheque),
            _ => Err(format!(
                "Invalid payment method: '{}'. Expected: cash, mobile_money, bank_transfer, or cheque",
                s
            )),
        }
    }
}

/// Loan model
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Loan {
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub principal_amount: f64,
    /// Flat interest in percent of principal
    pub interest_rate: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub installments: u32,
    pub status: LoanStatus,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Amount still owed on the loan, never negative
    pub fn outstanding_balance(&self) -> f64 {
        (self.total_amount - self.amount_paid).max(0.0)
    }
}

/// One scheduled installment of a loan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Repayment {
    #[serde(default)]
    pub id: Option<String>,
    pub loan_id: String,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub total_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    pub status: RepaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl Repayment {
    /// Balance left on this installment, never negative
    pub fn remaining_amount(&self) -> f64 {
        (self.total_amount - self.amount_paid).max(0.0)
    }
}

/// Query for listing loans
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListLoansQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoanStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<PaymentFrequency>,
}

impl ListLoansQuery {
    /// First page, no filters
    pub fn first_page(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            customer_id: None,
            status: None,
            payment_frequency: None,
        }
    }

    /// Same filters, different page
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Whether the server has pages after this one
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Single-resource response body, either `{ "data": ... }` or the bare value
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Request to create a new loan
#[derive(Debug, Serialize, Clone, Validate)]
pub struct CreateLoanRequest {
    #[validate(length(min = 1, message = "customer_id is required"))]
    pub customer_id: String,
    #[validate(range(min = 1.0, message = "principal_amount must be at least 1"))]
    pub principal_amount: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "interest_rate must be 0-100"))]
    pub interest_rate: f64,
    pub payment_frequency: PaymentFrequency,
    #[validate(range(min = 1, max = 520, message = "installments must be 1-520"))]
    pub installments: u32,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Installment line of a loan preview
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PreviewInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: f64,
}

/// Server-computed repayment plan for a loan that is not yet created
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoanPreview {
    pub principal_amount: f64,
    pub interest_amount: f64,
    pub total_amount: f64,
    pub installment_amount: f64,
    #[serde(default)]
    pub schedule: Vec<PreviewInstallment>,
}

/// Payload for recording a repayment against an installment
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PaymentSubmission {
    pub loan_id: String,
    pub installment_number: u32,
    pub amount_paid: f64,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub repayment_id: Option<String>,
}

/// Response of the repayment-update endpoint
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RepaymentUpdateResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
