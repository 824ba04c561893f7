use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{ClientOptions, FindOptions, IndexOptions},
};
use tracing::debug;
use staybook_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::{EntityId, ID_FIELD},
    error::{DocumentStoreError, DocumentStoreResult},
    mutation::{Mutation, WriteOutcome},
    query::{Query, QueryVisitor},
};

use crate::query::{MongoQueryTranslator, update_document};

/// Store backend over one MongoDB database. Collections map one-to-one to entity collections.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn id_filter(ids: Vec<EntityId>) -> Document {
        doc! {
            ID_FIELD: {
                "$in": ids
                    .into_iter()
                    .map(Bson::from)
                    .collect::<Vec<_>>()
            }
        }
    }
}

fn backend_error(e: mongodb::error::Error) -> DocumentStoreError {
    DocumentStoreError::Backend(e.to_string())
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_documents(&self, documents: Vec<(EntityId, Document)>, collection: &str) -> DocumentStoreResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        self.get_collection(collection)
            .insert_many(documents.into_iter().map(|(_, doc)| doc))
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn get_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        self.get_collection(collection)
            .find(Self::id_filter(ids))
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)
    }

    async fn query_documents(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }

        let filter = match &query.filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr)?,
            None => doc! {},
        };
        debug!(collection, %filter, "mongodb find");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)
    }

    async fn mutate_document(&self, id: EntityId, mutation: Mutation, collection: &str) -> DocumentStoreResult<WriteOutcome> {
        let result = self.get_collection(collection)
            .update_one(
                doc! { ID_FIELD: id },
                update_document(mutation),
            )
            .await
            .map_err(backend_error)?;

        Ok(WriteOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_documents(&self, ids: Vec<EntityId>, collection: &str) -> DocumentStoreResult<u64> {
        Ok(
            self.get_collection(collection)
                .delete_many(Self::id_filter(ids))
                .await
                .map_err(backend_error)?
                .deleted_count
        )
    }

    async fn add_index(&self, collection: &str, field: &str, unique: bool) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .create_index(
                IndexModel::builder()
                .keys(doc! { field: 1 })
                .options(
                    IndexOptions::builder()
                    .unique(unique)
                    .build()
                )
                .build()
            )
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates the client. The driver connects lazily, so an
    /// unreachable server surfaces on the first operation.
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let init_error = |e: mongodb::error::Error| DocumentStoreError::Initialization(e.to_string());

        let options = ClientOptions::parse(&self.dsn).await.map_err(init_error)?;
        let client = Client::with_options(options).map_err(init_error)?;

        Ok(MongoDbStore::new(client, self.database))
    }
}
