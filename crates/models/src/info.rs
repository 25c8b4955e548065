use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, OnConflict, Query},
    ActiveModelTrait, ConnectionTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use configs::InfoDefaults;

use crate::errors::ModelError;

/// Wire format of `release_time`, always UTC.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub const NAME: &str = "name";
pub const SYNOPSIS: &str = "synopsis";
pub const VERSION: &str = "version";
pub const INSTITUTION: &str = "institution";
pub const RELEASE_TIME: &str = "release_time";
pub const TAGS: &str = "tags";

/// Fields `/setinfo` must carry before the payload is parsed.
pub const REQUIRED_FIELDS: [&str; 6] = [NAME, SYNOPSIS, VERSION, INSTITUTION, TAGS, RELEASE_TIME];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub synopsis: String,
    pub version: String,
    pub institution: String,
    pub release_time: DateTimeUtc,
    pub support_email: String,
    pub category: String,
    pub research_subject: String,
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    /// `Some(true)` on the row seeded from defaults, `None` elsewhere.
    #[sea_orm(unique)]
    pub seed: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// JSON view of an info record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub synopsis: String,
    pub version: String,
    pub institution: String,
    pub release_time: String,
    pub support_email: String,
    pub category: String,
    pub research_subject: String,
    pub tags: String,
}

impl From<&Model> for InfoResponse {
    fn from(m: &Model) -> Self {
        Self {
            name: m.name.clone(),
            synopsis: m.synopsis.clone(),
            version: m.version.clone(),
            institution: m.institution.clone(),
            release_time: format_time(&m.release_time),
            support_email: m.support_email.clone(),
            category: m.category.clone(),
            research_subject: m.research_subject.clone(),
            tags: m.tags.clone(),
        }
    }
}

pub fn format_time(t: &DateTime<Utc>) -> String {
    t.format(TIME_FORMAT).to_string()
}

/// `tags` as received: only a list of strings is acceptable, the other
/// shapes are kept so the parser can reject them with a field error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    Text(String),
    List(Vec<serde_json::Value>),
    Other(serde_json::Value),
}

/// Typed `/setinfo` body. The camelCase names of the RPI wire format are
/// accepted alongside the snake_case ones.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfoPayload {
    pub name: Option<String>,
    pub synopsis: Option<String>,
    pub version: Option<String>,
    pub institution: Option<String>,
    #[serde(alias = "releaseTime")]
    pub release_time: Option<String>,
    #[serde(alias = "supportEmail")]
    pub support_email: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "researchSubject")]
    pub research_subject: Option<String>,
    pub tags: Option<TagsField>,
}

impl InfoPayload {
    /// Decode a request body. Anything but a JSON object with string fields is rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, ModelError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ModelError::Validation(format!("malformed json: {e}")))?;
        if !value.is_object() {
            return Err(ModelError::Validation("payload must be a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| ModelError::Validation(format!("invalid payload: {e}")))
    }

    fn has(&self, field: &str) -> bool {
        match field {
            NAME => self.name.is_some(),
            SYNOPSIS => self.synopsis.is_some(),
            VERSION => self.version.is_some(),
            INSTITUTION => self.institution.is_some(),
            RELEASE_TIME => self.release_time.is_some(),
            TAGS => self.tags.is_some(),
            _ => false,
        }
    }
}

/// Required-field schema check run before parsing.
pub fn validate_info_json(payload: &InfoPayload) -> Result<(), ModelError> {
    match REQUIRED_FIELDS.iter().find(|f| !payload.has(f)) {
        Some(missing) => Err(ModelError::not_set(missing)),
        None => Ok(()),
    }
}

/// An info record that has been validated but not saved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInfo {
    pub name: String,
    pub synopsis: String,
    pub version: String,
    pub institution: String,
    pub release_time: DateTime<Utc>,
    pub support_email: String,
    pub category: String,
    pub research_subject: String,
    pub tags: String,
}

impl NewInfo {
    pub fn from_defaults(d: &InfoDefaults) -> Self {
        Self {
            name: d.name.clone(),
            synopsis: d.synopsis.clone(),
            version: d.version.clone(),
            institution: d.institution.clone(),
            release_time: d.release_time,
            support_email: d.support_email.clone(),
            category: d.category.clone(),
            research_subject: d.research_subject.clone(),
            tags: d.tags.clone(),
        }
    }

    pub fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            name: Set(self.name),
            synopsis: Set(self.synopsis),
            version: Set(self.version),
            institution: Set(self.institution),
            release_time: Set(self.release_time),
            support_email: Set(self.support_email),
            category: Set(self.category),
            research_subject: Set(self.research_subject),
            tags: Set(self.tags),
            ..Default::default()
        }
    }
}

/// Build an unsaved record from a payload.
///
/// String fields are copied as given (absent ones become empty). `tags` must
/// be a non-empty list of strings and is joined with single spaces;
/// `release_time` must match [`TIME_FORMAT`]. Either failing yields
/// `"<field> not set"` and nothing is returned.
pub fn parse_info_from_json(payload: &InfoPayload) -> Result<NewInfo, ModelError> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let tags = join_tags(payload.tags.as_ref())?;
    let release_time = parse_release_time(payload.release_time.as_deref())?;
    Ok(NewInfo {
        name: text(&payload.name),
        synopsis: text(&payload.synopsis),
        version: text(&payload.version),
        institution: text(&payload.institution),
        release_time,
        support_email: text(&payload.support_email),
        category: text(&payload.category),
        research_subject: text(&payload.research_subject),
        tags,
    })
}

pub fn join_tags(tags: Option<&TagsField>) -> Result<String, ModelError> {
    let items = match tags {
        Some(TagsField::List(items)) if !items.is_empty() => items,
        _ => return Err(ModelError::not_set(TAGS)),
    };
    let words = items
        .iter()
        .map(|t| t.as_str().ok_or_else(|| ModelError::not_set(TAGS)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(words.join(" "))
}

pub fn parse_release_time(raw: Option<&str>) -> Result<DateTime<Utc>, ModelError> {
    let raw = raw.filter(|s| !s.is_empty()).ok_or_else(|| ModelError::not_set(RELEASE_TIME))?;
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .map(|t| t.and_utc())
        .map_err(|_| ModelError::not_set(RELEASE_TIME))
}

/// Most recently created record.
pub async fn latest<C: ConnectionTrait>(db: &C) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().order_by_desc(Column::Id).one(db).await?)
}

pub async fn insert<C: ConnectionTrait>(db: &C, new: NewInfo) -> Result<Model, ModelError> {
    Ok(new.into_active_model().insert(db).await?)
}

/// Insert `new` as the seed row, but only while the table is empty.
///
/// One statement: `INSERT .. SELECT .. WHERE NOT EXISTS (SELECT 1 FROM info)
/// ON CONFLICT (seed) DO NOTHING`. Writers racing on an empty table collide on
/// the unique `seed` column and all but one insert nothing. Being a write, it
/// also takes SQLite's write lock up front instead of upgrading a read lock.
/// Returns whether a row was written.
pub async fn insert_seed_if_empty<C: ConnectionTrait>(db: &C, new: NewInfo) -> Result<bool, ModelError> {
    let occupied = Query::select().expr(Expr::val(1)).from(Entity).to_owned();
    let row = Query::select()
        .exprs([
            Expr::val(new.name),
            Expr::val(new.synopsis),
            Expr::val(new.version),
            Expr::val(new.institution),
            Expr::val(new.release_time),
            Expr::val(new.support_email),
            Expr::val(new.category),
            Expr::val(new.research_subject),
            Expr::val(new.tags),
            Expr::val(true),
        ])
        .and_where(Expr::exists(occupied).not())
        .to_owned();
    let stmt = Query::insert()
        .into_table(Entity)
        .columns([
            Column::Name,
            Column::Synopsis,
            Column::Version,
            Column::Institution,
            Column::ReleaseTime,
            Column::SupportEmail,
            Column::Category,
            Column::ResearchSubject,
            Column::Tags,
            Column::Seed,
        ])
        .select_from(row)
        .map_err(|e| ModelError::Db(e.to_string()))?
        .on_conflict(OnConflict::column(Column::Seed).do_nothing().to_owned())
        .to_owned();
    let res = db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(res.rows_affected() > 0)
}

pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, ModelError> {
    use sea_orm::PaginatorTrait;
    Ok(Entity::find().count(db).await?)
}
