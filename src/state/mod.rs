//! Client state layer
//!
//! `LoanStore` is created once and handed to whoever needs it; there is no
//! global instance.

mod app_state;
mod reducer;
mod store;

pub use app_state::AppState;
pub use reducer::{
    reduce, LoanAction, LoanListState, LoanState, PaymentState, Scope, SingleLoanState,
    StoreEvent,
};
pub use store::{LoanStore, PaymentReceipt};
