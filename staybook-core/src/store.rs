//! Document store handle shared by the services.
//!
//! [`DocumentStore`] owns a type-erased backend so the backend can be picked at runtime from
//! configuration. Services receive it behind an `Arc` at construction time.
//!
//! # Example
//!
//! ```ignore
//! use staybook_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let orders = store.collection::<Order>();
//! ```

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreResult,
};

#[derive(Debug)]
pub struct DocumentStore {
    backend: Box<dyn DynStoreBackend>,
}

impl DocumentStore {
    pub fn new<B: StoreBackend + 'static>(backend: B) -> Self {
        Self { backend: Box::new(backend) }
    }

    pub fn collection<D: Document>(&self) -> TypedCollection<'_, D> {
        TypedCollection::new(&*self.backend)
    }

    pub async fn add_index(
        &self,
        collection: &str,
        field: &str,
        unique: bool,
    ) -> DocumentStoreResult<()> {
        self.backend
            .add_index(collection, field, unique)
            .await
    }

    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}
