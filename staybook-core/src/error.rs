//! Errors raised by the store layer.
//!
//! Every accessor call returns a [`DocumentStoreResult<T>`]. The services wrap these errors in
//! their own taxonomy before anything reaches the HTTP layer.

use bson::error::Error as BsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// A value could not be converted between the entity type and its stored BSON shape.
    #[error("cannot convert document: {0}")]
    Serialization(String),

    /// The backend could not be opened or prepared.
    #[error("cannot initialize store: {0}")]
    Initialization(String),

    /// An insert reused an id already present in the collection.
    #[error("duplicate id {id} in {collection}")]
    DuplicateId { id: String, collection: String },

    /// A string is not a valid object id.
    #[error("malformed id {0:?}")]
    InvalidId(String),

    /// A document or mutation is structurally unusable.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The storage engine reported a failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
