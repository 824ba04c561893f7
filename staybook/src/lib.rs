//! Booking backend for vacation stays.
//!
//! This crate wires the document store layer into a JSON API. Hosts list stays, guests place
//! orders on them, and both sides exchange messages attached to either entity. Changes are
//! pushed to connected clients over a websocket.
//!
//! # Layout
//!
//! - [`model`] - orders, stays, messages and the patches that update them
//! - [`filter`] - translation of listing filters into store queries
//! - [`service`] - one [`service::EntityService`] per entity kind
//! - [`notify`] - the push hub feeding websocket connections
//! - [`api`] - axum routes under `/api/order`, `/api/stay` and `/ws`
//! - [`server`] - startup, graceful shutdown and the store lifecycle
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use staybook::{memory::InMemoryStore, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DocumentStore::new(InMemoryStore::new()));
//!     let stays = StayService::new(store);
//!
//!     let filter_by = FilterBy { txt: Some("porto".into()), ..Default::default() };
//!     for stay in stays.query(&filter_by).await? {
//!         println!("{} in {}", stay.name, stay.loc.city);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! The server runs on the in-memory store by default. Set `STORE_BACKEND=mongodb` together with
//! `MONGO_URL` and `DB_NAME` to use MongoDB; that backend is compiled in through the default
//! `mongodb` feature.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod model;
pub mod notify;
pub mod prelude;
pub mod server;
pub mod service;

pub use bson;

/// In-memory store backend.
pub mod memory {
    pub use staybook_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB store backend.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use staybook_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
