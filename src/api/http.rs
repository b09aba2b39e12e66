//! reqwest-backed implementation of [`LoanApi`]

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::LoanApi;
use crate::auth::TokenStore;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::loan::{
    CreateLoanRequest, Envelope, ListLoansQuery, Loan, LoanPreview, Page, PaymentSubmission,
    Repayment, RepaymentUpdateResponse,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Raw bodies longer than this are not shown to users
const MAX_RAW_ERROR_LEN: usize = 512;

/// Loan API client speaking JSON over HTTP
pub struct HttpLoanApi {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpLoanApi {
    /// Create a new client for `config.api_base_url`
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ApiError::ValidationError(format!(
                "Invalid API base URL '{}': {}",
                config.api_base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::ValidationError(format!(
                "API base URL '{}' cannot have paths",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Base URL joined with percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn current_token(&self) -> Option<String> {
        match self.tokens.get().await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session token, sending request without it");
                None
            }
        }
    }

    /// Send a request and decode a successful JSON body
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = builder.header("x-request-id", &request_id);
        if let Some(token) = self.current_token().await {
            builder = builder.bearer_auth(token);
        }

        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let start = Instant::now();
        tracing::debug!(
            method = %method,
            path = %path,
            request_id = %request_id,
            "Request started"
        );

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    method = %method,
                    path = %path,
                    request_id = %request_id,
                    error = %e,
                    "Request failed before a response arrived"
                );
                return Err(e.into());
            }
        };

        let duration = start.elapsed();
        let status = response.status();

        if status.is_server_error() {
            tracing::error!(
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "Request completed with error"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "Request completed with client error"
            );
        } else {
            tracing::info!(
                method = %method,
                path = %path,
                status = %status.as_u16(),
                duration_ms = %duration.as_millis(),
                "Request completed"
            );
        }

        if !status.is_success() {
            let body = readable_body(response.text().await, &path, &request_id);
            return Err(ApiError::from_status(
                status.as_u16(),
                error_message(&body, status),
            ));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl LoanApi for HttpLoanApi {
    async fn list_loans(&self, query: &ListLoansQuery) -> ApiResult<Page<Loan>> {
        let builder = self.client.get(self.endpoint(&["loans"])).query(query);
        self.execute(builder).await
    }

    async fn get_loan(&self, id: &str) -> ApiResult<Loan> {
        let builder = self.client.get(self.endpoint(&["loans", id]));
        let body: Envelope<Loan> = self.execute(builder).await?;
        Ok(body.into_inner())
    }

    async fn get_schedule(&self, id: &str) -> ApiResult<Vec<Repayment>> {
        let builder = self.client.get(self.endpoint(&["loans", id, "schedule"]));
        let body: Envelope<Vec<Repayment>> = self.execute(builder).await?;
        Ok(body.into_inner())
    }

    async fn create_loan(&self, request: &CreateLoanRequest) -> ApiResult<Loan> {
        let builder = self.client.post(self.endpoint(&["loans"])).json(request);
        let body: Envelope<Loan> = self.execute(builder).await?;
        Ok(body.into_inner())
    }

    async fn preview_loan(&self, request: &CreateLoanRequest) -> ApiResult<LoanPreview> {
        let builder = self
            .client
            .post(self.endpoint(&["loans", "preview"]))
            .json(request);
        let body: Envelope<LoanPreview> = self.execute(builder).await?;
        Ok(body.into_inner())
    }

    async fn update_repayment(
        &self,
        submission: &PaymentSubmission,
    ) -> ApiResult<RepaymentUpdateResponse> {
        let builder = self
            .client
            .post(self.endpoint(&["repayments", "update"]))
            .json(submission);
        self.execute(builder).await
    }
}

/// Body text of an error response, empty when it could not be read
fn readable_body(body: reqwest::Result<String>, path: &str, request_id: &str) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(
                path = %path,
                request_id = %request_id,
                error = %e,
                "Could not read error response body"
            );
            String::new()
        }
    }
}

/// Pull the user-facing message out of an error body.
///
/// Understands `{"error": "..."}`, `{"error": {"message": "..."}}` and
/// `{"message": "..."}`; falls back to the raw body, then the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .get("error")
            .and_then(|e| {
                e.as_str()
                    .or_else(|| e.get("message").and_then(|m| m.as_str()))
            })
            .or_else(|| value.get("message").and_then(|m| m.as_str()));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= MAX_RAW_ERROR_LEN {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
