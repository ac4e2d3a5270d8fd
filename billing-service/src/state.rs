use std::sync::Arc;

use service_core::config::ServiceConfig;

use crate::services::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServiceConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
