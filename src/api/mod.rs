//! Loan-servicing API access
//!
//! `LoanApi` is the seam between the store and the network. The store only
//! ever talks to this trait, so tests and alternative transports plug in
//! without touching state logic.

mod http;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::loan::{
    CreateLoanRequest, ListLoansQuery, Loan, LoanPreview, Page, PaymentSubmission, Repayment,
    RepaymentUpdateResponse,
};

pub use http::HttpLoanApi;

/// Logical operations of the remote loan-servicing API
#[async_trait]
pub trait LoanApi: Send + Sync {
    /// `GET loans?page&limit&customer_id&status&payment_frequency`
    async fn list_loans(&self, query: &ListLoansQuery) -> ApiResult<Page<Loan>>;

    /// `GET loans/{id}`
    async fn get_loan(&self, id: &str) -> ApiResult<Loan>;

    /// `GET loans/{id}/schedule`
    async fn get_schedule(&self, id: &str) -> ApiResult<Vec<Repayment>>;

    /// `POST loans`
    async fn create_loan(&self, request: &CreateLoanRequest) -> ApiResult<Loan>;

    /// `POST loans/preview`
    async fn preview_loan(&self, request: &CreateLoanRequest) -> ApiResult<LoanPreview>;

    /// `POST repayments/update`
    async fn update_repayment(
        &self,
        submission: &PaymentSubmission,
    ) -> ApiResult<RepaymentUpdateResponse>;
}
