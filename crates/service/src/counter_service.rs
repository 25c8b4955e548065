use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, info, instrument};

use configs::StatisticDefaults;
use models::{errors::ModelError, statistic};

use crate::errors::{db_err, ServiceError};
use crate::locks::KeyedLocks;

/// Named invocation counters.
///
/// Each call takes the counter's key lock, opens a transaction, seeds the
/// row if absent, reads it, writes it and commits. Guard and transaction are dropped
/// on every exit path, which releases the key and rolls back unfinished work.
pub struct CounterService {
    db: DatabaseConnection,
    defaults: StatisticDefaults,
    locks: KeyedLocks,
}

impl CounterService {
    pub fn new(db: DatabaseConnection, defaults: StatisticDefaults) -> Self {
        Self { db, defaults, locks: KeyedLocks::new() }
    }

    /// Counter tracked by the demo application.
    pub fn invocations_name(&self) -> &str {
        &self.defaults.name
    }

    /// Fetch a counter, creating it with the seed value when absent.
    #[instrument(skip(self))]
    pub async fn get_or_seed(&self, name: &str) -> Result<statistic::Model, ServiceError> {
        let _guard = self.locks.lock(name).await;
        let txn = self.db.begin().await.map_err(db_err)?;
        let current = self.fetch_or_seed(&txn, name, false).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(current)
    }

    /// Add one to the stored value.
    ///
    /// A stored value that is not a non-negative integer is reported as
    /// [`ServiceError::Encoding`] and left untouched.
    #[instrument(skip(self))]
    pub async fn increment(&self, name: &str) -> Result<statistic::Model, ServiceError> {
        let saved = self
            .mutate(name, |current| Ok((statistic::next_value(&current.value)?, None)))
            .await?;
        debug!(name, value = %saved.value, "counter incremented");
        Ok(saved)
    }

    /// Set the value back to `"0"` and stamp `last_reset` with the current time.
    #[instrument(skip(self))]
    pub async fn reset(&self, name: &str) -> Result<statistic::Model, ServiceError> {
        let saved = self.mutate(name, |_| Ok(("0".to_string(), Some(Utc::now())))).await?;
        debug!(name, last_reset = %saved.last_reset, "counter reset");
        Ok(saved)
    }

    async fn mutate<F>(&self, name: &str, apply: F) -> Result<statistic::Model, ServiceError>
    where
        F: FnOnce(&statistic::Model) -> Result<(String, Option<DateTime<Utc>>), ModelError>,
    {
        let _guard = self.locks.lock(name).await;
        let txn = self.db.begin().await.map_err(db_err)?;
        let current = self.fetch_or_seed(&txn, name, true).await?;
        let (value, last_reset) = apply(&current)?;
        let saved = statistic::store(&txn, current, value, last_reset).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(saved)
    }

    // Seed before reading: the transaction's first statement is then a write,
    // so SQLite takes its write lock up front instead of upgrading a read lock.
    async fn fetch_or_seed(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
        for_update: bool,
    ) -> Result<statistic::Model, ServiceError> {
        if statistic::insert_if_absent(txn, name, &self.defaults.value, Utc::now()).await? {
            info!(name, value = %self.defaults.value, "seeded counter");
        }
        statistic::find_by_name(txn, name, for_update)
            .await?
            .ok_or_else(|| ServiceError::Db(format!("counter {name} missing after seed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, SharedSqlite};
    use sea_orm::{EntityTrait, PaginatorTrait};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> CounterService {
        CounterService::new(db, StatisticDefaults::default())
    }

    #[tokio::test]
    async fn seed_is_idempotent() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let svc = service(db.clone());
        let name = svc.invocations_name().to_string();

        let first = svc.get_or_seed(&name).await?;
        let second = svc.get_or_seed(&name).await?;
        assert_eq!(first.value, "0");
        assert_eq!(first, second);
        assert_eq!(statistic::Entity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn increments_in_sequence() -> Result<(), anyhow::Error> {
        let svc = service(get_db().await?);
        assert_eq!(svc.increment("invocations").await?.value, "1");
        assert_eq!(svc.increment("invocations").await?.value, "2");
        assert_eq!(svc.get_or_seed("invocations").await?.value, "2");
        Ok(())
    }

    #[tokio::test]
    async fn reset_zeroes_and_stamps() -> Result<(), anyhow::Error> {
        let svc = service(get_db().await?);
        let seeded = svc.get_or_seed("invocations").await?;
        svc.increment("invocations").await?;
        svc.increment("invocations").await?;

        let before = Utc::now();
        let reset = svc.reset("invocations").await?;
        assert_eq!(reset.value, "0");
        assert!(reset.last_reset.timestamp_micros() >= before.timestamp_micros());
        assert!(reset.last_reset >= seeded.last_reset);

        let reread = svc.get_or_seed("invocations").await?;
        assert_eq!(reread.value, "0");
        assert_eq!(reread.last_reset.timestamp_micros(), reset.last_reset.timestamp_micros());
        Ok(())
    }

    #[tokio::test]
    async fn increment_leaves_last_reset_alone() -> Result<(), anyhow::Error> {
        let svc = service(get_db().await?);
        let seeded = svc.get_or_seed("invocations").await?;
        let bumped = svc.increment("invocations").await?;
        assert_eq!(bumped.last_reset.timestamp_micros(), seeded.last_reset.timestamp_micros());
        Ok(())
    }

    #[tokio::test]
    async fn counters_are_independent() -> Result<(), anyhow::Error> {
        let svc = service(get_db().await?);
        svc.increment("a").await?;
        svc.increment("a").await?;
        svc.increment("b").await?;
        assert_eq!(svc.get_or_seed("a").await?.value, "2");
        assert_eq!(svc.get_or_seed("b").await?.value, "1");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() -> Result<(), anyhow::Error> {
        let svc = Arc::new(service(get_db().await?));
        let n = 32;
        let handles = (0..n)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.increment("invocations").await })
            })
            .collect::<Vec<_>>();
        for h in handles {
            h.await??;
        }
        assert_eq!(svc.get_or_seed("invocations").await?.value, n.to_string());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_seeding_creates_one_row() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let svc = Arc::new(service(db.clone()));
        let handles = (0..16)
            .map(|_| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.get_or_seed("fresh").await })
            })
            .collect::<Vec<_>>();
        let mut seen = Vec::new();
        for h in handles {
            seen.push(h.await??);
        }
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(statistic::Entity::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_value_is_encoding_error() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        statistic::insert_if_absent(&db, "broken", "abc", Utc::now()).await?;
        let svc = service(db.clone());

        let err = svc.increment("broken").await.unwrap_err();
        assert!(matches!(err, ServiceError::Encoding(_)));
        assert!(!err.is_client_error());
        // nothing was written
        assert_eq!(svc.get_or_seed("broken").await?.value, "abc");
        // a reset repairs it
        assert_eq!(svc.reset("broken").await?.value, "0");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn separate_pools_share_one_counter() -> Result<(), anyhow::Error> {
        let shared = SharedSqlite::create().await?;
        let a = Arc::new(service(shared.connect().await?));
        let b = Arc::new(service(shared.connect().await?));
        let per_pool = 10;

        let handles = (0..per_pool)
            .flat_map(|_| [Arc::clone(&a), Arc::clone(&b)])
            .map(|svc| tokio::spawn(async move { svc.increment("invocations").await }))
            .collect::<Vec<_>>();
        for h in handles {
            h.await??;
        }
        assert_eq!(a.get_or_seed("invocations").await?.value, (2 * per_pool).to_string());
        assert_eq!(statistic::Entity::find().count(&shared.connect().await?).await?, 1);
        Ok(())
    }
}
