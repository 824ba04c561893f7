//! Entity services: the business operations behind the HTTP handlers.
//!
//! [`EntityService`] is generic over the entity kind and issues exactly one store call per
//! operation. Every failure is logged with the collection and target id, then returned wrapped
//! in the [`ServiceError`] variant naming the operation.

pub mod order;
pub mod stay;

use bson::{doc, ser::serialize_to_bson};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, error};
use uuid::Uuid;
use staybook_core::{
    collection::TypedCollection,
    document::{Document, EntityId},
    error::DocumentStoreResult,
    mutation::{Mutation, WriteOutcome},
    store::DocumentStore,
};

use crate::{
    error::{ServiceError, ServiceResult},
    filter::{FilterBy, build_query},
    model::{Msg, NewMsg, Patch, require_target},
};

pub use order::OrderService;
pub use stay::StayService;

/// Array field holding an entity's messages.
const MSGS_FIELD: &str = "msgs";

/// A top-level record managed by an [`EntityService`].
pub trait Entity: Document + std::fmt::Debug {
    /// The fields an update may overwrite.
    type Patch: Patch + std::fmt::Debug;
}

#[derive(Debug)]
pub struct EntityService<E: Entity> {
    store: Arc<DocumentStore>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), _marker: PhantomData }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store, _marker: PhantomData }
    }

    fn collection(&self) -> TypedCollection<'_, E> {
        self.store.collection::<E>()
    }

    /// Returns the entities matching `filter_by`, one page of them when a page index is given.
    ///
    /// Results come back in the store's natural order.
    pub async fn query(&self, filter_by: &FilterBy) -> ServiceResult<Vec<E>> {
        let query = build_query(filter_by).map_err(|e| {
            error!(collection = E::collection_name(), error = %e, "cannot build query");
            ServiceError::InvalidId(e)
        })?;

        self.collection().query(query).await.map_err(|e| {
            error!(collection = E::collection_name(), error = %e, "cannot find entities");
            ServiceError::QueryFailed(e)
        })
    }

    /// Looks up one entity. `Ok(None)` means no entity has this id.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<E>> {
        let entity_id = EntityId::parse(id).map_err(|e| {
            error!(collection = E::collection_name(), id, error = %e, "cannot find entity");
            ServiceError::InvalidId(e)
        })?;

        self.collection().find_one(entity_id).await.map_err(|e| {
            error!(collection = E::collection_name(), id, error = %e, "cannot find entity");
            ServiceError::QueryFailed(e)
        })
    }

    /// Inserts `entity` as given and returns it.
    pub async fn add(&self, entity: E) -> ServiceResult<E> {
        match self.collection().insert(vec![entity.clone()]).await {
            Ok(()) => {
                debug!(collection = E::collection_name(), id = %entity.id(), "entity added");
                Ok(entity)
            }
            Err(e) => {
                error!(collection = E::collection_name(), id = %entity.id(), error = %e, "cannot insert entity");
                Err(ServiceError::InsertFailed(e))
            }
        }
    }

    /// Overwrites the mutable fields present in `patch` and echoes the patch back.
    pub async fn update(&self, patch: E::Patch) -> ServiceResult<E::Patch> {
        match self.set_fields(&patch).await {
            Ok(outcome) => {
                debug!(
                    collection = E::collection_name(),
                    id = patch.target_id(),
                    matched = outcome.matched,
                    "entity updated",
                );
                Ok(patch)
            }
            Err(e) => {
                error!(collection = E::collection_name(), id = patch.target_id(), error = %e, "cannot update entity");
                Err(ServiceError::UpdateFailed(e))
            }
        }
    }

    async fn set_fields(&self, patch: &E::Patch) -> DocumentStoreResult<WriteOutcome> {
        let entity_id = EntityId::parse(require_target(patch)?)?;
        let fields = patch.to_set()?;

        if fields.is_empty() {
            return Ok(WriteOutcome::default());
        }

        self.collection().mutate(entity_id, Mutation::set(fields)).await
    }

    /// Deletes the entity and returns its id. Removing an unknown id is not an error.
    pub async fn remove(&self, id: &str) -> ServiceResult<String> {
        let result = match EntityId::parse(id) {
            Ok(entity_id) => self.collection().delete(vec![entity_id]).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(deleted) => {
                debug!(collection = E::collection_name(), id, deleted, "entity removed");
                Ok(id.to_string())
            }
            Err(e) => {
                error!(collection = E::collection_name(), id, error = %e, "cannot remove entity");
                Err(ServiceError::RemoveFailed(e))
            }
        }
    }

    /// Appends a message with a freshly generated id and returns it.
    pub async fn add_msg(&self, entity_id: &str, msg: NewMsg) -> ServiceResult<Msg> {
        let msg = msg.into_msg(make_msg_id());

        match self.push_msg(entity_id, &msg).await {
            Ok(_) => Ok(msg),
            Err(e) => {
                error!(collection = E::collection_name(), id = entity_id, error = %e, "cannot add message");
                Err(ServiceError::UpdateFailed(e))
            }
        }
    }

    async fn push_msg(&self, entity_id: &str, msg: &Msg) -> DocumentStoreResult<WriteOutcome> {
        let entity_id = EntityId::parse(entity_id)?;

        self.collection()
            .mutate(entity_id, Mutation::push(MSGS_FIELD, serialize_to_bson(msg)?))
            .await
    }

    /// Removes the message with id `msg_id` and returns that id, whether or not it existed.
    pub async fn remove_msg(&self, entity_id: &str, msg_id: &str) -> ServiceResult<String> {
        let result = match EntityId::parse(entity_id) {
            Ok(id) => {
                self.collection()
                    .mutate(id, Mutation::pull(MSGS_FIELD, doc! { "id": msg_id }))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => Ok(msg_id.to_string()),
            Err(e) => {
                error!(collection = E::collection_name(), id = entity_id, msg_id, error = %e, "cannot remove message");
                Err(ServiceError::UpdateFailed(e))
            }
        }
    }
}

fn make_msg_id() -> String {
    Uuid::new_v4().simple().to_string()
}
