//! Screen controllers
//!
//! Each controller holds only transient view state (filters, expanded
//! panels, form inputs) and reads entity data from the shared store.

mod loan_detail;
mod loan_list;
mod payment_form;
mod payment_history;

pub use loan_detail::{LoanDetailView, LoanOverview};
pub use loan_list::{LoanFilters, LoanListView};
pub use payment_form::{PaymentForm, SubmitOutcome};
pub use payment_history::{history_rows, HistoryRow, PaymentHistoryView, ScheduleSummary};
