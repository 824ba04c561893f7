use staybook_core::error::DocumentStoreError;
use thiserror::Error;

/// Failures surfaced by the entity services.
///
/// Each variant names the operation that failed and wraps the store error behind it.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("invalid id: {0}")]
    InvalidId(#[source] DocumentStoreError),

    #[error("query failed: {0}")]
    QueryFailed(#[source] DocumentStoreError),

    #[error("insert failed: {0}")]
    InsertFailed(#[source] DocumentStoreError),

    #[error("update failed: {0}")]
    UpdateFailed(#[source] DocumentStoreError),

    #[error("remove failed: {0}")]
    RemoveFailed(#[source] DocumentStoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
