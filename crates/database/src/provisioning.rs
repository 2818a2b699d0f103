use crate::entities::{credential_notices, people};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseTransaction, DbErr};
use uuid::Uuid;

/// Hands newly created people their first-login credentials.
///
/// Runs inside the transaction that created `person`, so anything it writes
/// is rolled back together with the record that triggered it.
#[async_trait]
pub trait CredentialProvisioner: Send + Sync {
    async fn provision_and_notify(
        &self,
        txn: &DatabaseTransaction,
        person: &people::Model,
    ) -> Result<(), DbErr>;
}

/// Queues a one-time setup token in `credential_notices` for a mailer to pick up
#[derive(Debug, Clone)]
pub struct OutboxProvisioner {
    token_ttl: Duration,
}

impl OutboxProvisioner {
    const DEFAULT_TTL_HOURS: i64 = 72;

    pub fn new(token_ttl: Duration) -> Self {
        Self { token_ttl }
    }

    /// Reads `CREDENTIAL_TOKEN_TTL_HOURS`, falling back to 72 hours
    pub fn from_env() -> Self {
        let hours = std::env::var("CREDENTIAL_TOKEN_TTL_HOURS")
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(Self::DEFAULT_TTL_HOURS);

        Self::new(Duration::hours(hours))
    }
}

impl Default for OutboxProvisioner {
    fn default() -> Self {
        Self::new(Duration::hours(Self::DEFAULT_TTL_HOURS))
    }
}

#[async_trait]
impl CredentialProvisioner for OutboxProvisioner {
    async fn provision_and_notify(
        &self,
        txn: &DatabaseTransaction,
        person: &people::Model,
    ) -> Result<(), DbErr> {
        let now = Utc::now();

        credential_notices::ActiveModel {
            id: Set(Uuid::new_v4()),
            person_id: Set(person.id),
            email: Set(person.email.clone()),
            token: Set(Uuid::new_v4().simple().to_string()),
            expires_at: Set(now + self.token_ttl),
            sent_at: Set(None),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        debug!("Queued credential notice for {}", person.registration_id);
        Ok(())
    }
}
