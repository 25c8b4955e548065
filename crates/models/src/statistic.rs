use chrono::{DateTime, Utc};
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ActiveModelTrait, ConnectionTrait, DbBackend, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::info::format_time;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statistic")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// Non-negative integer stored as text.
    pub value: String,
    pub last_reset: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// JSON view of a counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticResponse {
    pub name: String,
    pub value: String,
    pub last_reset: String,
}

impl From<&Model> for StatisticResponse {
    fn from(m: &Model) -> Self {
        Self { name: m.name.clone(), value: m.value.clone(), last_reset: format_time(&m.last_reset) }
    }
}

pub fn decode_value(value: &str) -> Result<u64, ModelError> {
    value
        .parse::<u64>()
        .map_err(|_| ModelError::Encoding(format!("counter value {value:?} is not a non-negative integer")))
}

/// Stored value plus one, re-encoded.
pub fn next_value(value: &str) -> Result<String, ModelError> {
    decode_value(value)?
        .checked_add(1)
        .map(|n| n.to_string())
        .ok_or_else(|| ModelError::Encoding(format!("counter value {value:?} overflows")))
}

/// Point lookup. With `for_update` the row is locked until the surrounding
/// transaction ends (Postgres only; SQLite serialises writers already).
pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str, for_update: bool) -> Result<Option<Model>, ModelError> {
    let mut query = Entity::find_by_id(name.to_string());
    if for_update && db.get_database_backend() == DbBackend::Postgres {
        query = query.lock_exclusive();
    }
    Ok(query.one(db).await?)
}

/// Insert a counter unless one with the same name exists. Returns whether a row was written.
pub async fn insert_if_absent<C: ConnectionTrait>(
    db: &C,
    name: &str,
    value: &str,
    last_reset: DateTime<Utc>,
) -> Result<bool, ModelError> {
    let am = ActiveModel {
        name: Set(name.to_string()),
        value: Set(value.to_string()),
        last_reset: Set(last_reset),
    };
    let rows = Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(rows > 0)
}

/// Write `value` (and `last_reset` when given) to an existing counter.
pub async fn store<C: ConnectionTrait>(
    db: &C,
    current: Model,
    value: String,
    last_reset: Option<DateTime<Utc>>,
) -> Result<Model, ModelError> {
    let mut am: ActiveModel = current.into();
    am.value = Set(value);
    if let Some(t) = last_reset {
        am.last_reset = Set(t);
    }
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_value_increments() {
        assert_eq!(next_value("0").unwrap(), "1");
        assert_eq!(next_value("41").unwrap(), "42");
    }

    #[test]
    fn corrupt_values_are_encoding_errors() {
        for bad in ["", "abc", "-1", "1.5", " 3"] {
            assert!(matches!(next_value(bad), Err(ModelError::Encoding(_))), "value {bad:?}");
        }
        assert!(matches!(next_value(&u64::MAX.to_string()), Err(ModelError::Encoding(_))));
    }

    #[test]
    fn response_formats_last_reset() {
        let m = Model {
            name: "invocations".into(),
            value: "3".into(),
            last_reset: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        };
        let r = StatisticResponse::from(&m);
        assert_eq!(r.value, "3");
        assert_eq!(r.last_reset, "1970-01-01T00:00:00Z");
    }
}
