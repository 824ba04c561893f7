//! MongoDB backend implementation for staybook.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait. Filter
//! expressions are translated to native query documents and mutations to `$set`, `$push` and
//! `$pull` updates, so every service call is a single round-trip that MongoDB applies atomically
//! per document.
//!
//! The top-level `staybook` crate enables this backend through its `mongodb` feature.
//!
//! # Example
//!
//! ```ignore
//! use staybook_core::backend::StoreBackendBuilder;
//! use staybook_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "staybook_db")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as staybook_mongodb;

pub mod store;
pub mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
