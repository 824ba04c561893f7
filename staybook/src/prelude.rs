pub use staybook_core::{
    document::{Document, DocumentExt, EntityId},
    error::{DocumentStoreError, DocumentStoreResult},
    page::{PAGE_SIZE, PageRequest},
    store::DocumentStore,
};

pub use crate::{
    error::{ServiceError, ServiceResult},
    filter::FilterBy,
    model::{
        Guests, Location, MiniStay, MiniUser, Msg, NewMsg, Order, OrderDraft, OrderPatch, Patch,
        Stay, StayPatch,
    },
    notify::{PushEvent, PushHub, Target},
    service::{Entity, EntityService, OrderService, StayService},
};
