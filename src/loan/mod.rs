//! Loan domain module
//!
//! Contains the wire models and the derived repayment status.

mod model;
pub mod status;

pub use model::*;
pub use status::{effective_status, today};
