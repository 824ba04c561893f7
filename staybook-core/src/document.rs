//! Core traits and types for document representation and serialization.
//!
//! This module provides the trait every stored entity implements, the [`EntityId`] identifier
//! codec, and utilities for converting documents to and from the BSON shape the backends store.

use bson::{Bson, Document as BsonDocument, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::{fmt, str::FromStr};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Name of the identifier field inside a stored document.
pub const ID_FIELD: &str = "_id";

/// Opaque entity identifier backed by the store's native [`ObjectId`].
///
/// Over JSON the identifier travels as a 24 character hex string. On input it also accepts the
/// native BSON object id and the extended JSON form `{ "$oid": "..." }`, so the same type reads
/// back documents coming out of either backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(ObjectId);

impl EntityId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Decodes an identifier from its hex representation.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidId`] if `value` is not a valid object id.
    pub fn parse(value: &str) -> DocumentStoreResult<Self> {
        ObjectId::parse_str(value)
            .map(Self)
            .map_err(|_| DocumentStoreError::InvalidId(value.to_string()))
    }

    /// Returns the native object id.
    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// Returns the hex representation.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for EntityId {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ObjectId> for EntityId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<EntityId> for Bson {
    fn from(id: EntityId) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::ObjectId(oid) => Ok(Self(oid)),
            Bson::String(hex) => ObjectId::parse_str(&hex)
                .map(Self)
                .map_err(|_| D::Error::custom(format!("invalid object id: {hex}"))),
            Bson::Document(doc) => doc
                .get_str("$oid")
                .ok()
                .and_then(|hex| ObjectId::parse_str(hex).ok())
                .map(Self)
                .ok_or_else(|| D::Error::custom("expected an object id")),
            other => Err(D::Error::custom(format!("expected an object id, found {other}"))),
        }
    }
}

/// Core trait that all documents stored in a document store must implement.
///
/// # Example
///
/// ```ignore
/// use staybook_core::document::{Document, EntityId};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Stay {
///     #[serde(rename = "_id", default)]
///     pub id: EntityId,
///     pub name: String,
/// }
///
/// impl Document for Stay {
///     fn id(&self) -> &EntityId {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "stay"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &EntityId;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization utilities for documents.
///
/// Automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;

    /// Converts this document into the shape handed to a backend: a BSON document whose
    /// `_id` field holds the native object id.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the document does not serialize to a map.
    fn to_stored(&self) -> DocumentStoreResult<BsonDocument>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_stored(&self) -> DocumentStoreResult<BsonDocument> {
        let mut stored = match self.to_bson()? {
            Bson::Document(doc) => doc,
            other => {
                return Err(DocumentStoreError::InvalidDocument(format!(
                    "{} serialized to {:?}, expected a document",
                    Self::collection_name(),
                    other.element_type(),
                )));
            }
        };
        stored.insert(ID_FIELD, Bson::from(*self.id()));

        Ok(stored)
    }
}
