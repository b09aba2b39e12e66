//! Loan state records, actions and the reducer that applies them
//!
//! The reducer is a plain function over `&mut LoanState`. All network work
//! happens in the store; by the time an action reaches `reduce` it carries
//! the finished result.

use serde::Serialize;

use crate::error::StateError;
use crate::loan::{ListLoansQuery, Loan, Page, PaymentSubmission, Repayment};

/// Paginated loan list as shown on the list screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanListState {
    /// Loans in server page order, pages concatenated
    pub items: Vec<Loan>,
    pub page: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<StateError>,
    /// Query of the most recent dispatch, successful or not
    pub query: Option<ListLoansQuery>,
    /// Query whose pages make up `items`; next pages continue from it
    pub loaded_query: Option<ListLoansQuery>,
}

/// The loan currently opened in a detail view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleLoanState {
    pub loan: Option<Loan>,
    pub schedule: Vec<Repayment>,
    pub loading: bool,
    pub error: Option<StateError>,
    /// Id of the most recent dispatch
    pub requested_id: Option<String>,
}

/// Repayment submission in flight, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentState {
    pub submitting: bool,
    pub error: Option<StateError>,
    pub last_submitted: Option<PaymentSubmission>,
}

/// Everything the store owns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanState {
    pub list: LoanListState,
    pub selected: SingleLoanState,
    pub payment: PaymentState,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum LoanAction {
    FetchLoansStarted { query: ListLoansQuery },
    FetchLoansSucceeded { query: ListLoansQuery, page: Page<Loan> },
    FetchLoansFailed { error: StateError },
    ResetList,
    FetchLoanStarted { id: String },
    FetchLoanSucceeded { loan: Loan, schedule: Vec<Repayment> },
    FetchLoanFailed { error: StateError },
    ClearSelectedLoan,
    SubmitPaymentStarted,
    SubmitPaymentSucceeded { submission: PaymentSubmission },
    SubmitPaymentFailed { error: StateError },
}

/// Which part of the state an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    List,
    Loan,
    Payment,
}

/// Change notification sent after every applied action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    Loading {
        scope: Scope,
    },
    ListUpdated {
        page: u32,
        len: usize,
        has_more: bool,
    },
    ListReset,
    LoanUpdated {
        id: String,
    },
    LoanCleared,
    PaymentSubmitted {
        loan_id: String,
        installment_number: u32,
    },
    Failed {
        scope: Scope,
        error: StateError,
    },
}

/// Apply `action` to `state` and describe what changed
pub fn reduce(state: &mut LoanState, action: LoanAction) -> StoreEvent {
    match action {
        LoanAction::FetchLoansStarted { query } => {
            state.list.loading = true;
            state.list.query = Some(query);
            StoreEvent::Loading { scope: Scope::List }
        }
        LoanAction::FetchLoansSucceeded { query, page } => {
            let list = &mut state.list;
            let has_more = page.has_more();
            if page.page == 1 {
                list.items = page.data;
            } else {
                // Overlapping pages are kept as-is, duplicates included.
                list.items.extend(page.data);
            }
            list.page = page.page;
            list.total = page.total;
            list.total_pages = page.total_pages;
            list.has_more = has_more;
            list.loaded_query = Some(query);
            list.loading = false;
            list.error = None;
            StoreEvent::ListUpdated {
                page: list.page,
                len: list.items.len(),
                has_more,
            }
        }
        LoanAction::FetchLoansFailed { error } => {
            state.list.loading = false;
            state.list.error = Some(error.clone());
            StoreEvent::Failed {
                scope: Scope::List,
                error,
            }
        }
        LoanAction::ResetList => {
            state.list = LoanListState::default();
            StoreEvent::ListReset
        }
        LoanAction::FetchLoanStarted { id } => {
            state.selected.loading = true;
            state.selected.requested_id = Some(id);
            StoreEvent::Loading { scope: Scope::Loan }
        }
        LoanAction::FetchLoanSucceeded { loan, schedule } => {
            let id = loan.id.clone();
            state.selected = SingleLoanState {
                loan: Some(loan),
                schedule,
                loading: false,
                error: None,
                requested_id: state.selected.requested_id.take(),
            };
            StoreEvent::LoanUpdated { id }
        }
        LoanAction::FetchLoanFailed { error } => {
            state.selected.loading = false;
            state.selected.error = Some(error.clone());
            StoreEvent::Failed {
                scope: Scope::Loan,
                error,
            }
        }
        LoanAction::ClearSelectedLoan => {
            state.selected = SingleLoanState::default();
            StoreEvent::LoanCleared
        }
        LoanAction::SubmitPaymentStarted => {
            state.payment.submitting = true;
            state.payment.error = None;
            StoreEvent::Loading {
                scope: Scope::Payment,
            }
        }
        LoanAction::SubmitPaymentSucceeded { submission } => {
            let event = StoreEvent::PaymentSubmitted {
                loan_id: submission.loan_id.clone(),
                installment_number: submission.installment_number,
            };
            state.payment = PaymentState {
                submitting: false,
                error: None,
                last_submitted: Some(submission),
            };
            event
        }
        LoanAction::SubmitPaymentFailed { error } => {
            state.payment.submitting = false;
            state.payment.error = Some(error.clone());
            StoreEvent::Failed {
                scope: Scope::Payment,
                error,
            }
        }
    }
}
