//! Single-document mutations.
//!
//! A [`Mutation`] describes an in-place change to one stored document. Backends apply each
//! mutation as one atomic step, so concurrent pushes and pulls against the same array never
//! lose each other's writes.

use bson::{Bson, Document as BsonDocument};

use crate::{document::ID_FIELD, error::{DocumentStoreError, DocumentStoreResult}};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Overwrites the given top-level fields, leaving all other fields untouched.
    Set(BsonDocument),
    /// Appends `value` to the array at `field`, creating the array if it is missing.
    Push {
        field: String,
        value: Bson,
    },
    /// Removes every element of the array at `field` whose sub-fields equal all of `matching`.
    Pull {
        field: String,
        matching: BsonDocument,
    },
}

impl Mutation {
    pub fn set(fields: BsonDocument) -> Self {
        Mutation::Set(fields)
    }

    pub fn push(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Mutation::Push { field: field.into(), value: value.into() }
    }

    pub fn pull(field: impl Into<String>, matching: BsonDocument) -> Self {
        Mutation::Pull { field: field.into(), matching }
    }

    /// Rejects mutations that would touch the identifier or do nothing at all.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] describing the problem.
    pub fn validate(&self) -> DocumentStoreResult<()> {
        match self {
            Mutation::Set(fields) if fields.is_empty() => Err(DocumentStoreError::InvalidDocument(
                "set mutation without fields".to_string(),
            )),
            Mutation::Set(fields) if fields.contains_key(ID_FIELD) => Err(
                DocumentStoreError::InvalidDocument("the identifier cannot be overwritten".to_string()),
            ),
            Mutation::Push { field, .. } | Mutation::Pull { field, .. } if field == ID_FIELD => Err(
                DocumentStoreError::InvalidDocument("the identifier is not an array".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Outcome of a mutation or delete against a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOutcome {
    /// Number of documents the identifier matched (0 or 1).
    pub matched: u64,
    /// Number of documents actually changed.
    pub modified: u64,
}
