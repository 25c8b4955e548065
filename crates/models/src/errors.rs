use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// A stored value does not decode; only corruption produces this.
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn not_set(field: &str) -> Self {
        Self::Validation(format!("{field} not set"))
    }
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Db(e.to_string())
    }
}
