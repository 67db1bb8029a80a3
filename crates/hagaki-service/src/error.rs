use thiserror::Error;

use hagaki_core::error::CoreError;
use hagaki_db::error::DbError;

/// Service layer errors.
///
/// Carries the store failure taxonomy: `NotFound`, `Forbidden`, `Malformed`
/// and `UnsupportedMutation` map directly onto protocol responses;
/// `UidProbeExhausted` is the bounded replacement for the original
/// unbounded UID collision loop.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Malformed vCard: {0}")]
    Malformed(String),

    #[error("Unsupported property mutation: {0}")]
    UnsupportedMutation(String),

    #[error("UID probe exhausted after {0} attempts")]
    UidProbeExhausted(usize),

    #[error("Not Authenticated")]
    NotAuthenticated,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<diesel::result::Error> for ServiceError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Db(DbError::DatabaseError(e))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
