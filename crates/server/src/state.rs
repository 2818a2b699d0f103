use database::{clock::SystemClock, provisioning::OutboxProvisioner};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handles every route gets
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub provisioner: Arc<OutboxProvisioner>,
    pub clock: Arc<SystemClock>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            provisioner: Arc::new(OutboxProvisioner::from_env()),
            clock: Arc::new(SystemClock),
        }
    }
}
