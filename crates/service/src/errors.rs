use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    /// Caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Encoding(msg) => Self::Encoding(msg),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

pub(crate) fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}
