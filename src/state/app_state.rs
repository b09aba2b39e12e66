//! Application state shared across views

use std::sync::Arc;

use crate::api::{HttpLoanApi, LoanApi};
use crate::auth::{FileTokenStore, TokenStore};
use crate::config::Config;
use crate::error::ApiResult;

use super::LoanStore;

/// Shared application state, cloned into every view controller
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<LoanStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn LoanApi>, tokens: Arc<dyn TokenStore>) -> Self {
        let store = Arc::new(LoanStore::new(api, config.page_size));
        Self {
            config: Arc::new(config),
            store,
            tokens,
        }
    }

    /// Wire the HTTP client and the on-disk token store from `config`
    pub fn from_config(config: Config) -> ApiResult<Self> {
        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(config.token_store_path.clone()));
        let api: Arc<dyn LoanApi> = Arc::new(HttpLoanApi::new(&config, tokens.clone())?);
        Ok(Self::new(config, api, tokens))
    }
}
