use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use loanbook::api::{HttpLoanApi, LoanApi};
use loanbook::auth::{MemoryTokenStore, TokenStore};
use loanbook::config::Config;
use loanbook::error::ApiError;
use loanbook::loan::{
    ListLoansQuery, LoanStatus, PaymentFrequency, PaymentMethod, PaymentSubmission,
    RepaymentStatus,
};

fn loan_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "customer_id": "C-1",
        "customer_name": "Amina Njeri",
        "principal_amount": 1000.0,
        "interest_rate": 10.0,
        "total_amount": 1100.0,
        "amount_paid": 275.0,
        "payment_frequency": "weekly",
        "installments": 4,
        "status": "active",
        "start_date": "2024-01-01"
    })
}

fn client(server: &MockServer, tokens: Arc<dyn TokenStore>) -> HttpLoanApi {
    let config = Config::for_base_url(&format!("{}/api", server.uri())).unwrap();
    HttpLoanApi::new(&config, tokens).unwrap()
}

fn anonymous(server: &MockServer) -> HttpLoanApi {
    client(server, Arc::new(MemoryTokenStore::new()))
}

#[tokio::test]
async fn test_list_loans_sends_filters_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "20"))
        .and(query_param("status", "active"))
        .and(query_param("payment_frequency", "monthly"))
        .and(header("authorization", "Bearer session-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [loan_json("L-21"), loan_json("L-22")],
            "page": 2,
            "limit": 20,
            "total": 22,
            "total_pages": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("session-abc")));
    let query = ListLoansQuery {
        status: Some(LoanStatus::Active),
        payment_frequency: Some(PaymentFrequency::Monthly),
        ..ListLoansQuery::first_page(20)
    }
    .with_page(2);

    let page = api.list_loans(&query).await.unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, "L-21");
    assert_eq!(page.total, 22);
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_absent_filters_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "page": 1,
            "limit": 20,
            "total": 0,
            "total_pages": 0
        })))
        .mount(&server)
        .await;

    anonymous(&server)
        .list_loans(&ListLoansQuery::first_page(20))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("page=1&limit=20"));
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn test_get_loan_accepts_wrapped_and_bare_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": loan_json("L-1") })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(loan_json("L-2")))
        .mount(&server)
        .await;

    let api = anonymous(&server);
    let wrapped = api.get_loan("L-1").await.unwrap();
    let bare = api.get_loan("L-2").await.unwrap();

    assert_eq!(wrapped.id, "L-1");
    assert_eq!(wrapped.outstanding_balance(), 825.0);
    assert_eq!(bare.id, "L-2");
}

#[tokio::test]
async fn test_get_schedule() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "R-1",
                "loan_id": "L-1",
                "installment_number": 1,
                "due_date": "2024-01-08",
                "total_amount": 275.0,
                "amount_paid": 275.0,
                "status": "PAID",
                "payment_date": "2024-01-08",
                "payment_method": "mobile_money"
            },
            {
                "loan_id": "L-1",
                "installment_number": 2,
                "due_date": "2024-01-15",
                "total_amount": 275.0,
                "status": "PENDING"
            }
        ])))
        .mount(&server)
        .await;

    let schedule = anonymous(&server).get_schedule("L-1").await.unwrap();

    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule[0].status, RepaymentStatus::Paid);
    assert_eq!(schedule[0].payment_method, Some(PaymentMethod::MobileMoney));
    assert_eq!(schedule[1].amount_paid, 0.0);
    assert!(schedule[1].id.is_none());
}

#[tokio::test]
async fn test_not_found_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Loan not found" })),
        )
        .mount(&server)
        .await;

    let err = anonymous(&server).get_loan("L-404").await.unwrap_err();

    match err {
        ApiError::NotFound(message) => assert_eq!(message, "Loan not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = anonymous(&server).get_loan("L-1").await.unwrap_err();

    assert_eq!(err.error_code(), "SERVER_ERROR");
    assert_eq!(err.message(), "upstream down");
}

#[tokio::test]
async fn test_expired_session_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "message": "Token expired" } })),
        )
        .mount(&server)
        .await;

    let api = client(&server, Arc::new(MemoryTokenStore::with_token("stale")));
    let err = api.get_loan("L-1").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token expired"));
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = anonymous(&server).get_loan("L-1").await.unwrap_err();
    assert_eq!(err.error_code(), "DECODE_ERROR");
}

#[tokio::test]
async fn test_update_repayment_posts_submission() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/repayments/update"))
        .and(body_partial_json(json!({
            "loan_id": "L-1",
            "installment_number": 2,
            "amount_paid": 150.0,
            "payment_date": "2024-01-16",
            "payment_method": "bank_transfer"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Installment already settled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = PaymentSubmission {
        loan_id: "L-1".to_string(),
        installment_number: 2,
        amount_paid: 150.0,
        payment_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
        notes: None,
        payment_method: PaymentMethod::BankTransfer,
        repayment_id: None,
    };
    let response = anonymous(&server)
        .update_repayment(&submission)
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Installment already settled"));
}

#[tokio::test]
async fn test_token_changes_apply_to_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loans/L-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(loan_json("L-1")))
        .mount(&server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let api = client(&server, tokens.clone());

    tokens.set("first").await.unwrap();
    api.get_loan("L-1").await.unwrap();
    tokens.clear().await.unwrap();
    api.get_loan("L-1").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0]
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer first")
    );
    assert!(requests[1].headers.get("authorization").is_none());
}
