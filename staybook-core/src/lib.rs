//! Thin document store layer used by the staybook services.
//!
//! This crate is the core of the staybook workspace and provides:
//!
//! - **Documents** ([`document`]) - The [`document::Document`] trait and the [`document::EntityId`] codec
//! - **Store backend abstraction** ([`backend`]) - Traits implemented by the in-memory and MongoDB backends
//! - **Queries** ([`query`]) - Filter expressions and offset/limit windows
//! - **Mutations** ([`mutation`]) - Atomic single-document field and array updates
//! - **Collections** ([`collection`]) - Typed collection accessor
//! - **Document store** ([`store`]) - Handle owning the selected backend
//! - **Pagination** ([`page`]) - Page index to offset/limit conversion
//! - **Error handling** ([`error`]) - Error and result types

#[allow(unused_extern_crates)]
extern crate self as staybook_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod mutation;
pub mod page;
pub mod query;
pub mod store;
