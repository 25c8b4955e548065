use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{info, instrument, warn};

use configs::InfoDefaults;
use models::info::{self, InfoPayload, NewInfo};

use crate::errors::{db_err, ServiceError};
use crate::locks::KeyedLocks;

/// Every info read and write serialises on this key.
const INFO_LOCK: &str = "info";

/// Service description record. Writes append a row; reads return the newest.
pub struct InfoService {
    db: DatabaseConnection,
    defaults: InfoDefaults,
    locks: KeyedLocks,
}

impl InfoService {
    pub fn new(db: DatabaseConnection, defaults: InfoDefaults) -> Self {
        Self { db, defaults, locks: KeyedLocks::new() }
    }

    /// Current record, seeding one from the defaults when the table is empty.
    #[instrument(skip(self))]
    pub async fn get_or_seed(&self) -> Result<info::Model, ServiceError> {
        let _guard = self.locks.lock(INFO_LOCK).await;
        let txn = self.db.begin().await.map_err(db_err)?;
        let current = self.latest_or_seed(&txn).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(current)
    }

    /// Validate a decoded payload and store it as the new current record.
    #[instrument(skip_all)]
    pub async fn set_info(&self, payload: &InfoPayload) -> Result<info::Model, ServiceError> {
        let new = info::validate_info_json(payload)
            .and_then(|_| info::parse_info_from_json(payload))
            .map_err(|e| {
                warn!(error = %e, "rejected info payload");
                ServiceError::from(e)
            })?;

        let _guard = self.locks.lock(INFO_LOCK).await;
        let txn = self.db.begin().await.map_err(db_err)?;
        let saved = info::insert(&txn, new).await?;
        txn.commit().await.map_err(db_err)?;
        info!(id = saved.id, name = %saved.name, version = %saved.version, "info updated");
        Ok(saved)
    }

    /// [`InfoService::set_info`] on a raw request body.
    pub async fn set_info_from_json(&self, body: &[u8]) -> Result<info::Model, ServiceError> {
        let payload = InfoPayload::from_json(body)?;
        self.set_info(&payload).await
    }

    // The seed insert runs first so the transaction opens with a write.
    async fn latest_or_seed(&self, txn: &DatabaseTransaction) -> Result<info::Model, ServiceError> {
        if info::insert_seed_if_empty(txn, NewInfo::from_defaults(&self.defaults)).await? {
            info!(name = %self.defaults.name, "seeded info record");
        }
        info::latest(txn)
            .await?
            .ok_or_else(|| ServiceError::Db("info record missing after seed".into()))
    }
}
