//! In-memory storage implementation for document stores.
//!
//! Documents are kept per collection in insertion order behind an async-aware read-write lock.
//! Every write, including array pushes and pulls, runs under the write lock, which gives the same
//! per-document atomicity the services rely on from MongoDB.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document as BsonDocument};

use staybook_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::EntityId,
    error::{DocumentStoreError, DocumentStoreResult},
    mutation::{Mutation, WriteOutcome},
    query::Query,
};

use crate::evaluator::{Comparable, DocumentEvaluator, lookup};

type CollectionVec = Vec<(EntityId, BsonDocument)>;
type StoreMap = HashMap<String, CollectionVec>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so clones share the
/// same data. Queries scan the whole collection; there are no indexes.
///
/// # Example
///
/// ```ignore
/// use staybook_memory::InMemoryStore;
/// use staybook_core::{backend::StoreBackend, document::EntityId};
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     let id = EntityId::new();
///     store.insert_documents(vec![(id, doc! { "_id": id, "name": "Alice" })], "users").await?;
///
///     let docs = store.get_documents(vec![id], "users").await?;
///     assert_eq!(docs.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder
    }
}

fn apply_mutation(document: &mut BsonDocument, mutation: Mutation) -> DocumentStoreResult<bool> {
    match mutation {
        Mutation::Set(fields) => {
            let mut changed = false;

            for (key, value) in fields {
                if document.get(&key) != Some(&value) {
                    document.insert(key, value);
                    changed = true;
                }
            }

            Ok(changed)
        },
        Mutation::Push { field, value } => match document.get_mut(&field) {
            Some(Bson::Array(items)) => {
                items.push(value);
                Ok(true)
            },
            Some(_) => Err(DocumentStoreError::InvalidDocument(format!("field {field} is not an array"))),
            None => {
                document.insert(field, Bson::Array(vec![value]));
                Ok(true)
            },
        },
        Mutation::Pull { field, matching } => match document.get_mut(&field) {
            Some(Bson::Array(items)) => {
                let before = items.len();

                items.retain(|item| !matches_all(item, &matching));

                Ok(items.len() != before)
            },
            Some(_) => Err(DocumentStoreError::InvalidDocument(format!("field {field} is not an array"))),
            None => Ok(false),
        },
    }
}

fn matches_all(item: &Bson, matching: &BsonDocument) -> bool {
    let Some(item) = item.as_document() else {
        return false;
    };

    matching.iter().all(|(key, expected)| {
        lookup(item, key)
            .map(|actual| Comparable::from(actual) == Comparable::from(expected))
            .unwrap_or(false)
    })
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(&self, documents: Vec<(EntityId, BsonDocument)>, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_vec = store
            .entry(collection.to_string())
            .or_default();

        let mut taken: HashSet<EntityId> = collection_vec.iter().map(|(id, _)| *id).collect();

        if let Some((id, _)) = documents.iter().find(|(id, _)| !taken.insert(*id)) {
            return Err(DocumentStoreError::DuplicateId { id: id.to_hex(), collection: collection.to_string() });
        }

        collection_vec.extend(documents);

        Ok(())
    }

    async fn get_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<Vec<BsonDocument>> {
        let store = self.store.read().await;
        let collection_vec = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        Ok(
            collection_vec
                .iter()
                .filter(|(id, _)| ids.contains(id))
                .map(|(_, doc)| doc.clone())
                .collect()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<BsonDocument>> {
        let store = self.store.read().await;
        let collection_vec = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut matched = Vec::new();

        for (_, doc) in collection_vec {
            let keep = match &query.filter {
                Some(filter) => DocumentEvaluator::new(doc).evaluate(filter)?,
                None => true,
            };

            if keep {
                matched.push(doc);
            }
        }

        Ok(
            matched
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect()
        )
    }

    async fn mutate_document(&self, id: EntityId, mutation: Mutation, collection: &str) -> DocumentStoreResult<WriteOutcome> {
        let mut store = self.store.write().await;
        let document = store
            .get_mut(collection)
            .and_then(|col| col.iter_mut().find(|(existing, _)| *existing == id))
            .map(|(_, doc)| doc);

        match document {
            Some(document) => Ok(WriteOutcome {
                matched: 1,
                modified: apply_mutation(document, mutation)? as u64,
            }),
            None => Ok(WriteOutcome::default()),
        }
    }

    async fn delete_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<u64> {
        let mut store = self.store.write().await;
        let collection_vec = match store.get_mut(collection) {
            Some(col) => col,
            None => return Ok(0),
        };

        let before = collection_vec.len();
        collection_vec.retain(|(id, _)| !ids.contains(id));

        Ok((before - collection_vec.len()) as u64)
    }

    async fn add_index(&self, _collection: &str, _field: &str, _unique: bool) -> DocumentStoreResult<()> {
        // In-memory store does not support indexing (no-op)
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use staybook_core::query::Filter;

    fn msg(id: &str) -> Bson {
        Bson::Document(doc! { "id": id, "txt": format!("msg {id}") })
    }

    async fn seeded() -> (InMemoryStore, EntityId) {
        let store = InMemoryStore::new();
        let id = EntityId::new();

        store
            .insert_documents(
                vec![(id, doc! { "_id": id, "price": 100, "msgs": [msg("a"), msg("b"), msg("c")] })],
                "stay",
            )
            .await
            .unwrap();

        (store, id)
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let (store, id) = seeded().await;

        let err = store
            .insert_documents(vec![(id, doc! { "_id": id })], "stay")
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::DuplicateId { .. }));
    }

    #[tokio::test]
    async fn insert_rejects_duplicates_within_batch() {
        let store = InMemoryStore::new();
        let id = EntityId::new();

        let err = store
            .insert_documents(vec![(id, doc! { "_id": id, "n": 1 }), (id, doc! { "_id": id, "n": 2 })], "stay")
            .await
            .unwrap_err();

        assert!(matches!(err, DocumentStoreError::DuplicateId { .. }));
        assert!(store.get_documents(vec![id], "stay").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_keeps_insertion_order_and_window() {
        let store = InMemoryStore::new();
        let docs = (0..5)
            .map(|n| {
                let id = EntityId::new();
                (id, doc! { "_id": id, "n": n })
            })
            .collect::<Vec<_>>();
        store.insert_documents(docs, "stay").await.unwrap();

        let page = store
            .query_documents(Query::builder().offset(1).limit(2).build(), "stay")
            .await
            .unwrap();
        let ns = page.iter().map(|d| d.get_i32("n").unwrap()).collect::<Vec<_>>();
        assert_eq!(ns, vec![1, 2]);

        let filtered = store
            .query_documents(Query::builder().filter(Filter::gte("n", 3)).build(), "stay")
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn query_on_missing_collection_is_empty() {
        let store = InMemoryStore::new();

        assert!(store.query_documents(Query::new(), "nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_touches_only_named_fields() {
        let (store, id) = seeded().await;

        let outcome = store
            .mutate_document(id, Mutation::set(doc! { "price": 200 }), "stay")
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome { matched: 1, modified: 1 });

        let doc = store.get_documents(vec![id], "stay").await.unwrap().remove(0);
        assert_eq!(doc.get_i32("price").unwrap(), 200);
        assert_eq!(doc.get_array("msgs").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn pull_preserves_order_of_remaining() {
        let (store, id) = seeded().await;

        store
            .mutate_document(id, Mutation::pull("msgs", doc! { "id": "b" }), "stay")
            .await
            .unwrap();

        let doc = store.get_documents(vec![id], "stay").await.unwrap().remove(0);
        assert_eq!(doc.get_array("msgs").unwrap(), &vec![msg("a"), msg("c")]);
    }

    #[tokio::test]
    async fn pull_of_unknown_element_changes_nothing() {
        let (store, id) = seeded().await;

        let outcome = store
            .mutate_document(id, Mutation::pull("msgs", doc! { "id": "zzz" }), "stay")
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome { matched: 1, modified: 0 });
    }

    #[tokio::test]
    async fn push_creates_missing_array() {
        let store = InMemoryStore::new();
        let id = EntityId::new();
        store.insert_documents(vec![(id, doc! { "_id": id })], "order").await.unwrap();

        store
            .mutate_document(id, Mutation::push("msgs", msg("x")), "order")
            .await
            .unwrap();

        let doc = store.get_documents(vec![id], "order").await.unwrap().remove(0);
        assert_eq!(doc.get_array("msgs").unwrap(), &vec![msg("x")]);
    }

    #[tokio::test]
    async fn concurrent_pushes_are_all_kept() {
        let (store, id) = seeded().await;

        let tasks = (0..20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .mutate_document(id, Mutation::push("msgs", msg(&format!("p{n}"))), "stay")
                        .await
                        .unwrap();
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap();
        }

        let doc = store.get_documents(vec![id], "stay").await.unwrap().remove(0);
        assert_eq!(doc.get_array("msgs").unwrap().len(), 23);
    }

    #[tokio::test]
    async fn mutate_and_delete_of_missing_document_match_nothing() {
        let (store, _) = seeded().await;
        let ghost = EntityId::new();

        let outcome = store
            .mutate_document(ghost, Mutation::set(doc! { "price": 1 }), "stay")
            .await
            .unwrap();
        assert_eq!(outcome.matched, 0);

        assert_eq!(store.delete_documents(vec![ghost], "stay").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let (store, id) = seeded().await;

        assert_eq!(store.delete_documents(vec![id], "stay").await.unwrap(), 1);
        assert!(store.get_documents(vec![id], "stay").await.unwrap().is_empty());
    }
}
