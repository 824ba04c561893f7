//! Typed collection handles.
//!
//! A [`TypedCollection`] is the collection accessor the services talk to: it converts between
//! the entity type and the BSON documents the backend stores, and forwards each call to the
//! backend as exactly one operation.
//!
//! # Example
//!
//! ```ignore
//! let stays = store.collection::<Stay>();
//! stays.insert(vec![stay.clone()]).await?;
//! let found = stays.find_one(*stay.id()).await?;
//! ```

use bson::Bson;
use std::marker::PhantomData;

use crate::{
    backend::DynStoreBackend,
    document::{Document, DocumentExt, EntityId},
    error::DocumentStoreResult,
    mutation::{Mutation, WriteOutcome},
    query::Query,
};

#[derive(Debug)]
pub struct TypedCollection<'a, D: Document> {
    name: &'static str,
    backend: &'a dyn DynStoreBackend,
    _marker: PhantomData<D>,
}

impl<'a, D: Document> TypedCollection<'a, D> {
    pub(crate) fn new(backend: &'a dyn DynStoreBackend) -> Self {
        Self { name: D::collection_name(), backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Inserts new documents into the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if serialization or
    /// insertion fails.
    pub async fn insert(&self, documents: Vec<D>) -> DocumentStoreResult<()> {
        self.backend
            .insert_documents(
                documents
                    .iter()
                    .map(|d| d.to_stored().map(|stored| (*d.id(), stored)))
                    .collect::<DocumentStoreResult<Vec<_>>>()?,
                self.name,
            )
            .await
    }

    /// Retrieves documents by their IDs. Unknown IDs are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if deserialization or
    /// retrieval fails.
    pub async fn get(&self, ids: Vec<EntityId>) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .get_documents(ids, self.name)
            .await?
            .into_iter()
            .map(|doc| D::from_bson(Bson::Document(doc)))
            .collect()
    }

    /// Retrieves a single document, `None` when no document has this ID.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if deserialization or
    /// retrieval fails.
    pub async fn find_one(&self, id: EntityId) -> DocumentStoreResult<Option<D>> {
        Ok(self.get(vec![id]).await?.into_iter().next())
    }

    /// Queries documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if deserialization or
    /// the query fails.
    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .query_documents(query, self.name)
            .await?
            .into_iter()
            .map(|doc| D::from_bson(Bson::Document(doc)))
            .collect()
    }

    /// Applies a single-document mutation.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the mutation is
    /// invalid or the backend rejects it.
    pub async fn mutate(&self, id: EntityId, mutation: Mutation) -> DocumentStoreResult<WriteOutcome> {
        mutation.validate()?;

        self.backend
            .mutate_document(id, mutation, self.name)
            .await
    }

    /// Deletes documents by their IDs and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the operation fails.
    pub async fn delete(&self, ids: Vec<EntityId>) -> DocumentStoreResult<u64> {
        self.backend
            .delete_documents(ids, self.name)
            .await
    }
}
