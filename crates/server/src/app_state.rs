use std::sync::Arc;

use impersonation::TokenService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) tokens: Arc<TokenService>,
    pub(crate) default_expires_in: String,
}
