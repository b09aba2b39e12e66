//! Session handling for the loan client
//!
//! - A single opaque session token kept in device-local storage
//! - Expiry inspection when the token happens to be a JWT

mod jwt;
mod token_store;

use thiserror::Error;

pub use jwt::{inspect_token, session_expired, SessionClaims};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

/// Token storage errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed token data: {0}")]
    Malformed(String),
}
