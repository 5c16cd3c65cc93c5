//! Read-only collaborator services
//!
//! The engine validates ids against these seams but never mutates through
//! them. The CRUD layer that owns products, stores and users is out of
//! scope; the in-memory implementations here stand in for it in tests,
//! examples, and embedded deployments.

pub mod catalog;
pub mod directory;
pub mod registry;

pub use catalog::{Catalog, InMemoryCatalog};
pub use directory::{CustomerDirectory, InMemoryDirectory};
pub use registry::{InMemoryStoreRegistry, StoreRegistry};
