//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over storage implementations so the services
//! run unchanged against the in-memory backend (tests, local development) or MongoDB.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: Object-safe mirror used for runtime backend selection
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use staybook_core::{backend::StoreBackend, document::EntityId};
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = EntityId::new();
//! backend.insert_documents(vec![(id, doc! { "_id": id, "name": "Alice" })], "users").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Document as BsonDocument;
use std::fmt::Debug;

use crate::{
    document::EntityId,
    error::DocumentStoreResult,
    mutation::{Mutation, WriteOutcome},
    query::Query,
};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Each call is independent: no operation spans multiple round-trips that need
/// in-process coordination.
///
/// # Error Handling
///
/// Operations return [`DocumentStoreResult<T>`](crate::error::DocumentStoreResult).
/// Implementers should document which error variants may be returned by each operation.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts new documents into a collection, creating the collection if needed.
    ///
    /// Each document already carries its native `_id`; the paired [`EntityId`] is the same
    /// identifier, handed over separately for backends that key by it.
    async fn insert_documents(
        &self,
        documents: Vec<(EntityId, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Retrieves documents from a collection by their IDs.
    ///
    /// Unknown IDs are omitted from the result; an empty result is not an error.
    async fn get_documents(
        &self,
        ids: Vec<EntityId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>>;

    /// Queries documents in a collection.
    ///
    /// Results are returned in the backend's natural iteration order, after applying the
    /// query's filter, offset and limit.
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>>;

    /// Applies a single mutation to the document with the given ID.
    ///
    /// The mutation is atomic at the document level. A missing document is not an error; the
    /// returned [`WriteOutcome`] reports `matched == 0`.
    async fn mutate_document(
        &self,
        id: EntityId,
        mutation: Mutation,
        collection: &str,
    ) -> DocumentStoreResult<WriteOutcome>;

    /// Deletes documents from a collection by their IDs and returns how many were removed.
    ///
    /// Unknown IDs are silently skipped.
    async fn delete_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<u64>;

    /// Ensures an index on `field` exists. Backends without indexes treat this as a no-op.
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()>;

    /// Releases the backend's resources.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn insert_documents(
        &self,
        documents: Vec<(EntityId, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<()>;
    async fn get_documents(
        &self,
        ids: Vec<EntityId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>>;
    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>>;
    async fn mutate_document(
        &self,
        id: EntityId,
        mutation: Mutation,
        collection: &str,
    ) -> DocumentStoreResult<WriteOutcome>;
    async fn delete_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<u64>;
    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn insert_documents(
        &self,
        documents: Vec<(EntityId, BsonDocument)>,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::insert_documents(self, documents, collection)
            .await
    }

    async fn get_documents(
        &self,
        ids: Vec<EntityId>,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>> {
        StoreBackend::get_documents(self, ids, collection)
            .await
    }

    async fn query_documents(
        &self,
        query: Query,
        collection: &str,
    ) -> DocumentStoreResult<Vec<BsonDocument>> {
        StoreBackend::query_documents(self, query, collection)
            .await
    }

    async fn mutate_document(
        &self,
        id: EntityId,
        mutation: Mutation,
        collection: &str,
    ) -> DocumentStoreResult<WriteOutcome> {
        StoreBackend::mutate_document(self, id, mutation, collection)
            .await
    }

    async fn delete_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<u64> {
        StoreBackend::delete_documents(self, ids, collection)
            .await
    }

    async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        StoreBackend::add_index(self, collection, field, unique)
            .await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
