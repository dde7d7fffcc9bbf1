//! Shared application state.

use std::sync::Arc;

use fob_contest::application::lifecycle::ContestService;

use crate::config::GatewayBindings;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The contest lifecycle service.
    pub contests: ContestService,
    /// Token admin requests must present; `None` locks admin routes.
    pub admin_token: Option<Arc<str>>,
    /// Channel and guild ids handed to the gateway.
    pub bindings: GatewayBindings,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        contests: ContestService,
        admin_token: Option<String>,
        bindings: GatewayBindings,
    ) -> Self {
        Self {
            contests,
            admin_token: admin_token.map(Arc::from),
            bindings,
        }
    }
}
