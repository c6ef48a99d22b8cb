use std::sync::Arc;

use ocular_ai::Diagnoser;
use ocular_core::ServiceConfig;

/// Shared state for every route.
///
/// Built once at startup; the classifier inside the [`Diagnoser`] is
/// read-only afterwards and dropped when the server shuts down.
#[derive(Clone)]
pub struct AppState {
    pub diagnoser: Diagnoser,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(diagnoser: Diagnoser, config: ServiceConfig) -> Self {
        Self {
            diagnoser,
            config: Arc::new(config),
        }
    }
}
