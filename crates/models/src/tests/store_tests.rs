use anyhow::Result;
use chrono::{Duration, Utc};

use super::setup_test_db;
use crate::info::{self, NewInfo};
use crate::statistic;
use configs::InfoDefaults;

#[tokio::test]
async fn insert_if_absent_creates_once() -> Result<()> {
    let db = setup_test_db().await?;
    let t0 = Utc::now();

    assert!(statistic::insert_if_absent(&db, "invocations", "0", t0).await?);
    // a second seed for the same name is a no-op
    assert!(!statistic::insert_if_absent(&db, "invocations", "7", t0 + Duration::hours(1)).await?);

    let found = statistic::find_by_name(&db, "invocations", false).await?.unwrap();
    assert_eq!(found.value, "0");
    assert_eq!(found.last_reset.timestamp(), t0.timestamp());
    assert!(statistic::find_by_name(&db, "other", false).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn store_updates_value_and_optionally_last_reset() -> Result<()> {
    let db = setup_test_db().await?;
    let t0 = Utc::now() - Duration::days(1);
    statistic::insert_if_absent(&db, "hits", "4", t0).await?;

    let current = statistic::find_by_name(&db, "hits", true).await?.unwrap();
    let next = statistic::next_value(&current.value)?;
    let saved = statistic::store(&db, current, next, None).await?;
    assert_eq!(saved.value, "5");
    assert_eq!(saved.last_reset.timestamp(), t0.timestamp());

    let t1 = Utc::now();
    let saved = statistic::store(&db, saved, "0".into(), Some(t1)).await?;
    assert_eq!(saved.value, "0");
    assert_eq!(saved.last_reset.timestamp(), t1.timestamp());

    let reread = statistic::find_by_name(&db, "hits", false).await?.unwrap();
    assert_eq!(reread, saved);
    Ok(())
}

#[tokio::test]
async fn latest_info_follows_creation_order() -> Result<()> {
    let db = setup_test_db().await?;
    assert!(info::latest(&db).await?.is_none());

    let mut first = NewInfo::from_defaults(&InfoDefaults::default());
    first.version = "1".into();
    let mut second = first.clone();
    second.version = "2".into();

    let a = info::insert(&db, first).await?;
    let b = info::insert(&db, second).await?;
    assert!(b.id > a.id);

    let latest = info::latest(&db).await?.unwrap();
    assert_eq!(latest.version, "2");
    assert_eq!(info::count(&db).await?, 2);
    Ok(())
}

#[tokio::test]
async fn release_time_survives_round_trip() -> Result<()> {
    let db = setup_test_db().await?;
    let mut new = NewInfo::from_defaults(&InfoDefaults::default());
    new.release_time = info::parse_release_time(Some("2015-10-11T12:13:14Z"))?;
    info::insert(&db, new).await?;

    let stored = info::latest(&db).await?.unwrap();
    assert_eq!(info::format_time(&stored.release_time), "2015-10-11T12:13:14Z");
    Ok(())
}

#[tokio::test]
async fn seed_insert_only_fills_empty_table() -> Result<()> {
    let db = setup_test_db().await?;
    let defaults = NewInfo::from_defaults(&InfoDefaults::default());

    assert!(info::insert_seed_if_empty(&db, defaults.clone()).await?);
    assert!(!info::insert_seed_if_empty(&db, defaults.clone()).await?);
    let seeded = info::latest(&db).await?.unwrap();
    assert_eq!(seeded.seed, Some(true));
    assert_eq!(seeded.release_time.timestamp(), defaults.release_time.timestamp());

    // ordinary inserts leave the marker empty and are never blocked by it
    let mut next = defaults.clone();
    next.version = "9".into();
    let plain = info::insert(&db, next.clone()).await?;
    let again = info::insert(&db, next).await?;
    assert_eq!(plain.seed, None);
    assert_eq!(again.seed, None);
    assert_eq!(info::count(&db).await?, 3);
    Ok(())
}
