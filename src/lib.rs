//! loanbook client library
//!
//! Client-side state for a microfinance loan-servicing API: paginated loan
//! lists, loan detail with repayment schedules, payment history, and
//! repayment submission with client-side checks.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod loan;
pub mod payment;
pub mod state;
pub mod telemetry;
pub mod view;
