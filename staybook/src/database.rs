use tracing::info;
use staybook_core::{
    backend::StoreBackendBuilder,
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    store::DocumentStore,
};
use staybook_memory::InMemoryStore;

use crate::{
    config::{BackendKind, Config},
    model::Order,
};

/// Opens the configured backend and makes sure the lookup indexes exist.
pub async fn connect(config: &Config) -> DocumentStoreResult<DocumentStore> {
    let store = match config.backend {
        BackendKind::Memory => {
            info!("Using in-memory store");
            DocumentStore::new(InMemoryStore::builder().build().await?)
        }
        BackendKind::MongoDb => connect_mongodb(config).await?,
    };

    ensure_indexes(&store).await?;

    Ok(store)
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(config: &Config) -> DocumentStoreResult<DocumentStore> {
    use staybook_mongodb::MongoDbStore;

    info!(db = %config.db_name, "Connecting to MongoDB");
    let backend = MongoDbStore::builder(&config.mongo_url, &config.db_name)
        .build()
        .await?;

    Ok(DocumentStore::new(backend))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_config: &Config) -> DocumentStoreResult<DocumentStore> {
    Err(DocumentStoreError::Initialization(
        "built without the mongodb feature".to_string(),
    ))
}

async fn ensure_indexes(store: &DocumentStore) -> DocumentStoreResult<()> {
    for field in ["hostId", "buyer._id"] {
        store
            .add_index(Order::collection_name(), field, false)
            .await
            .map_err(|e| DocumentStoreError::Initialization(format!("index on {field}: {e}")))?;
    }

    Ok(())
}
