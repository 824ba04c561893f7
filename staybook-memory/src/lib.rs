//! In-memory document storage backend for staybook.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It is used by the test suites and for running the server locally without a database.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Type-erased storage** - Stores documents as BSON, in insertion order
//! - **Query support** - Dotted paths, comparisons, case-insensitive substring, set membership
//! - **Atomic mutations** - Field sets and array push/pull applied under the write lock
//!
//! # Quick Start
//!
//! ```ignore
//! use staybook_core::store::DocumentStore;
//! use staybook_memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let stays = store.collection::<Stay>();
//! ```

#[allow(unused_extern_crates)]
extern crate self as staybook_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
