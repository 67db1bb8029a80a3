use thiserror::Error;

/// Application layer errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] hagaki_core::error::CoreError),

    #[error(transparent)]
    Db(#[from] hagaki_db::error::DbError),

    #[error(transparent)]
    Service(#[from] hagaki_service::error::ServiceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
