//! Shared fixtures for integration tests
//!
//! `FakeLoanApi` answers from scripted queues and records every call so
//! tests can assert on what the store actually sent.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use loanbook::api::LoanApi;
use loanbook::error::{ApiError, ApiResult};
use loanbook::loan::{
    CreateLoanRequest, ListLoansQuery, Loan, LoanPreview, LoanStatus, Page, PaymentFrequency,
    PaymentSubmission, PreviewInstallment, Repayment, RepaymentStatus, RepaymentUpdateResponse,
};
use loanbook::state::LoanStore;

#[derive(Default)]
pub struct FakeLoanApi {
    pages: Mutex<VecDeque<ApiResult<Page<Loan>>>>,
    loans: Mutex<HashMap<String, Loan>>,
    schedules: Mutex<HashMap<String, Vec<Repayment>>>,
    updates: Mutex<VecDeque<ApiResult<RepaymentUpdateResponse>>>,
    created: Mutex<VecDeque<ApiResult<Loan>>>,
    list_gate: Mutex<Option<Arc<Notify>>>,
    pub list_calls: Mutex<Vec<ListLoansQuery>>,
    pub detail_calls: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<PaymentSubmission>>,
    pub create_calls: Mutex<Vec<CreateLoanRequest>>,
}

impl FakeLoanApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_page(&self, page: Page<Loan>) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_list_error(&self, error: ApiError) {
        self.pages.lock().unwrap().push_back(Err(error));
    }

    /// Hold the next list request until the returned handle is notified
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn insert_loan(&self, loan: Loan, schedule: Vec<Repayment>) {
        self.schedules
            .lock()
            .unwrap()
            .insert(loan.id.clone(), schedule);
        self.loans.lock().unwrap().insert(loan.id.clone(), loan);
    }

    pub fn push_update(&self, response: ApiResult<RepaymentUpdateResponse>) {
        self.updates.lock().unwrap().push_back(response);
    }

    pub fn push_created(&self, response: ApiResult<Loan>) {
        self.created.lock().unwrap().push_back(response);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn last_list_call(&self) -> Option<ListLoansQuery> {
        self.list_calls.lock().unwrap().last().cloned()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl LoanApi for FakeLoanApi {
    async fn list_loans(&self, query: &ListLoansQuery) -> ApiResult<Page<Loan>> {
        self.list_calls.lock().unwrap().push(query.clone());
        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted page".to_string())))
    }

    async fn get_loan(&self, id: &str) -> ApiResult<Loan> {
        self.detail_calls.lock().unwrap().push(id.to_string());
        self.loans
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Loan {} not found", id)))
    }

    async fn get_schedule(&self, id: &str) -> ApiResult<Vec<Repayment>> {
        self.schedules
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Loan {} not found", id)))
    }

    async fn create_loan(&self, request: &CreateLoanRequest) -> ApiResult<Loan> {
        self.create_calls.lock().unwrap().push(request.clone());
        self.created
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted loan".to_string())))
    }

    async fn preview_loan(&self, request: &CreateLoanRequest) -> ApiResult<LoanPreview> {
        let interest = request.principal_amount * request.interest_rate / 100.0;
        let total = request.principal_amount + interest;
        let each = total / request.installments as f64;
        Ok(LoanPreview {
            principal_amount: request.principal_amount,
            interest_amount: interest,
            total_amount: total,
            installment_amount: each,
            schedule: (1..=request.installments)
                .map(|n| PreviewInstallment {
                    installment_number: n,
                    due_date: request.start_date + chrono::Duration::weeks(n as i64),
                    amount: each,
                })
                .collect(),
        })
    }

    async fn update_repayment(
        &self,
        submission: &PaymentSubmission,
    ) -> ApiResult<RepaymentUpdateResponse> {
        self.submissions.lock().unwrap().push(submission.clone());
        self.updates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted update".to_string())))
    }
}

pub fn store(api: &Arc<FakeLoanApi>) -> Arc<LoanStore> {
    Arc::new(LoanStore::new(api.clone(), 20))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn loan(id: &str) -> Loan {
    Loan {
        id: id.to_string(),
        customer_id: "C-1".to_string(),
        customer_name: Some("Amina Njeri".to_string()),
        principal_amount: 1000.0,
        interest_rate: 10.0,
        total_amount: 1100.0,
        amount_paid: 0.0,
        payment_frequency: PaymentFrequency::Weekly,
        installments: 4,
        status: LoanStatus::Active,
        start_date: date(2024, 1, 1),
        end_date: None,
        created_at: None,
    }
}

/// Loans `L-{from}` through `L-{to}`, inclusive
pub fn loans(from: u32, to: u32) -> Vec<Loan> {
    (from..=to).map(|n| loan(&format!("L-{}", n))).collect()
}

pub fn page(data: Vec<Loan>, page: u32, total: u64, total_pages: u32) -> Page<Loan> {
    Page {
        data,
        page,
        limit: 20,
        total,
        total_pages,
    }
}

pub fn installment(
    loan_id: &str,
    number: u32,
    due: NaiveDate,
    status: RepaymentStatus,
    total: f64,
    paid: f64,
) -> Repayment {
    Repayment {
        id: Some(format!("{}-R{}", loan_id, number)),
        loan_id: loan_id.to_string(),
        installment_number: number,
        due_date: due,
        total_amount: total,
        amount_paid: paid,
        status,
        notes: None,
        payment_date: None,
        payment_method: None,
    }
}

/// Four weekly installments of 275: one paid, one partial, two pending
pub fn schedule(loan_id: &str) -> Vec<Repayment> {
    vec![
        installment(loan_id, 1, date(2024, 1, 8), RepaymentStatus::Paid, 275.0, 275.0),
        installment(loan_id, 2, date(2024, 1, 15), RepaymentStatus::Partial, 275.0, 100.0),
        installment(loan_id, 3, date(2024, 1, 22), RepaymentStatus::Pending, 275.0, 0.0),
        installment(loan_id, 4, date(2024, 1, 29), RepaymentStatus::Pending, 275.0, 0.0),
    ]
}

pub fn accepted() -> ApiResult<RepaymentUpdateResponse> {
    Ok(RepaymentUpdateResponse {
        success: true,
        error: None,
    })
}
