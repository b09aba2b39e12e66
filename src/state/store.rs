//! The loan store: owns `LoanState`, runs requests, applies results
//!
//! Every dispatcher follows the same shape: apply a `*Started` action, await
//! the API, then apply the success or failure action. Each application takes
//! the write lock once. Concurrent dispatches are not coordinated; whichever
//! response lands last is what the state shows.

use std::sync::Arc;

use futures_util::future::try_join;
use tokio::sync::{broadcast, RwLock};
use validator::Validate;

use super::reducer::{
    reduce, LoanAction, LoanListState, LoanState, PaymentState, SingleLoanState, StoreEvent,
};
use crate::api::LoanApi;
use crate::error::{ApiError, StateError};
use crate::loan::{
    CreateLoanRequest, ListLoansQuery, Loan, LoanPreview, PaymentSubmission, Repayment,
};
use crate::payment::validate_payment_amount;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of an accepted repayment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub submission: PaymentSubmission,
    /// Whether the follow-up list refresh succeeded
    pub list_refreshed: bool,
}

/// Shared client state container
pub struct LoanStore {
    api: Arc<dyn LoanApi>,
    state: RwLock<LoanState>,
    events: broadcast::Sender<StoreEvent>,
    page_size: u32,
}

impl LoanStore {
    /// Create a store backed by `api`
    pub fn new(api: Arc<dyn LoanApi>, page_size: u32) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            api,
            state: RwLock::new(LoanState::default()),
            events,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Receive a `StoreEvent` after every state change
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> LoanState {
        self.state.read().await.clone()
    }

    pub async fn list(&self) -> LoanListState {
        self.state.read().await.list.clone()
    }

    pub async fn selected(&self) -> SingleLoanState {
        self.state.read().await.selected.clone()
    }

    pub async fn payment(&self) -> PaymentState {
        self.state.read().await.payment.clone()
    }

    async fn apply(&self, action: LoanAction) {
        let event = {
            let mut state = self.state.write().await;
            reduce(&mut state, action)
        };
        // No subscribers is fine; state stays authoritative.
        let _ = self.events.send(event);
    }

    /// Fetch one page of loans.
    ///
    /// Page 1 replaces the list; later pages append.
    pub async fn fetch_loans(&self, query: ListLoansQuery) -> Result<(), StateError> {
        tracing::info!(
            page = query.page,
            limit = query.limit,
            status = ?query.status,
            customer_id = ?query.customer_id,
            payment_frequency = ?query.payment_frequency,
            "Fetching loans"
        );

        self.apply(LoanAction::FetchLoansStarted {
            query: query.clone(),
        })
        .await;

        match self.api.list_loans(&query).await {
            Ok(page) => {
                self.apply(LoanAction::FetchLoansSucceeded { query, page })
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "Loan list fetch failed");
                let error = StateError::from(&e);
                self.apply(LoanAction::FetchLoansFailed {
                    error: error.clone(),
                })
                .await;
                Err(error)
            }
        }
    }

    /// Re-fetch page 1 with the filters of the list currently shown.
    ///
    /// Falls back to the last dispatched query when nothing has loaded yet.
    pub async fn refresh_loans(&self) -> Result<(), StateError> {
        let query = {
            let state = self.state.read().await;
            state
                .list
                .loaded_query
                .as_ref()
                .or(state.list.query.as_ref())
                .map(|q| q.with_page(1))
        };
        let query = query.unwrap_or_else(|| ListLoansQuery::first_page(self.page_size));
        self.fetch_loans(query).await
    }

    /// Fetch the page after the last one received, with the same filters.
    ///
    /// Returns `Ok(false)` without a request when nothing has loaded yet or
    /// the last page is already shown. A request already in flight does not
    /// block this one.
    pub async fn fetch_next_page(&self) -> Result<bool, StateError> {
        let next = {
            let state = self.state.read().await;
            let list = &state.list;
            list.loaded_query
                .as_ref()
                .filter(|_| list.has_more)
                .map(|q| q.with_page(list.page + 1))
        };

        match next {
            Some(query) => self.fetch_loans(query).await.map(|_| true),
            None => Ok(false),
        }
    }

    /// Drop every loaded list item
    pub async fn reset_list(&self) {
        self.apply(LoanAction::ResetList).await;
    }

    /// Fetch a loan and its repayment schedule together
    pub async fn fetch_loan(&self, id: &str) -> Result<(), StateError> {
        tracing::info!(loan_id = id, "Fetching loan detail");

        self.apply(LoanAction::FetchLoanStarted { id: id.to_string() })
            .await;

        match try_join(self.api.get_loan(id), self.api.get_schedule(id)).await {
            Ok((loan, schedule)) => {
                self.apply(LoanAction::FetchLoanSucceeded { loan, schedule })
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(loan_id = id, error = %e, "Loan detail fetch failed");
                let error = StateError::from(&e);
                self.apply(LoanAction::FetchLoanFailed {
                    error: error.clone(),
                })
                .await;
                Err(error)
            }
        }
    }

    /// Forget the loan shown in the detail view
    pub async fn clear_selected_loan(&self) {
        self.apply(LoanAction::ClearSelectedLoan).await;
    }

    /// Record a repayment against `repayment`.
    ///
    /// The amount is checked against the installment before anything is
    /// sent. On success the list is re-fetched from page 1, and the detail
    /// view too when it shows the same loan.
    pub async fn submit_payment(
        &self,
        repayment: &Repayment,
        submission: PaymentSubmission,
    ) -> Result<PaymentReceipt, StateError> {
        if let Err(e) = check_submission(repayment, &submission) {
            tracing::debug!(
                loan_id = %submission.loan_id,
                installment = submission.installment_number,
                error = %e,
                "Payment refused before submission"
            );
            let error = StateError::from(&e);
            self.apply(LoanAction::SubmitPaymentFailed {
                error: error.clone(),
            })
            .await;
            return Err(error);
        }

        tracing::info!(
            loan_id = %submission.loan_id,
            installment = submission.installment_number,
            amount = submission.amount_paid,
            method = submission.payment_method.as_str(),
            "Submitting payment"
        );

        self.apply(LoanAction::SubmitPaymentStarted).await;

        let result = match self.api.update_repayment(&submission).await {
            Ok(response) if response.success => Ok(()),
            Ok(response) => Err(ApiError::Rejected(
                response
                    .error
                    .unwrap_or_else(|| "Payment was not recorded".to_string()),
            )),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(
                loan_id = %submission.loan_id,
                installment = submission.installment_number,
                error = %e,
                "Payment submission failed"
            );
            let error = StateError::from(&e);
            self.apply(LoanAction::SubmitPaymentFailed {
                error: error.clone(),
            })
            .await;
            return Err(error);
        }

        self.apply(LoanAction::SubmitPaymentSucceeded {
            submission: submission.clone(),
        })
        .await;

        let list_refreshed = self.refresh_loans().await.is_ok();

        let shows_same_loan = self
            .state
            .read()
            .await
            .selected
            .loan
            .as_ref()
            .is_some_and(|l| l.id == submission.loan_id);
        if shows_same_loan {
            // Failure is already recorded on the detail state.
            let _ = self.fetch_loan(&submission.loan_id).await;
        }

        Ok(PaymentReceipt {
            submission,
            list_refreshed,
        })
    }

    /// Compute a repayment preview without creating anything
    pub async fn preview_loan(&self, request: &CreateLoanRequest) -> Result<LoanPreview, StateError> {
        request
            .validate()
            .map_err(|e| StateError::from(ApiError::from(e)))?;
        self.api.preview_loan(request).await.map_err(|e| {
            tracing::warn!(error = %e, "Loan preview failed");
            StateError::from(e)
        })
    }

    /// Create a loan and reload the list from page 1
    pub async fn create_loan(&self, request: CreateLoanRequest) -> Result<Loan, StateError> {
        request
            .validate()
            .map_err(|e| StateError::from(ApiError::from(e)))?;

        let loan = self.api.create_loan(&request).await.map_err(|e| {
            tracing::warn!(customer_id = %request.customer_id, error = %e, "Loan creation failed");
            StateError::from(e)
        })?;
        tracing::info!(loan_id = %loan.id, customer_id = %loan.customer_id, "Loan created");

        if let Err(e) = self.refresh_loans().await {
            tracing::warn!(error = %e, "List refresh after loan creation failed");
        }
        Ok(loan)
    }
}

/// The submission must target `repayment` and respect its ceiling
fn check_submission(repayment: &Repayment, submission: &PaymentSubmission) -> Result<(), ApiError> {
    if submission.loan_id != repayment.loan_id
        || submission.installment_number != repayment.installment_number
    {
        return Err(ApiError::ValidationError(format!(
            "Submission for loan {} installment {} does not match installment {} of loan {}",
            submission.loan_id,
            submission.installment_number,
            repayment.installment_number,
            repayment.loan_id
        )));
    }
    validate_payment_amount(repayment, submission.amount_paid)?;
    Ok(())
}
