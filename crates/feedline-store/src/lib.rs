//! feedline-store: document-store boundary for the Feedline backend
//!
//! This crate provides:
//! - The `DocumentStore` trait: hierarchical collections of keyed documents
//! - `FirestoreStore`: REST client for the hosted document database
//! - `MemoryStore`: in-memory implementation for tests and local development
//! - Collection addressing and the store error taxonomy
//!
//! # Architecture
//!
//! Consistency, indexing and durability belong to the store behind the
//! trait; callers get single-call operations with no cross-call
//! coordination. The HTTP facade receives a `DocumentStore` handle at
//! construction and never knows which implementation it holds.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedline_store::{CollectionPath, DocumentStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let publications = CollectionPath::root("publications")?;
//! let created = store.add(&publications, fields).await?;
//! let all = store.list(&publications).await?;
//! ```

pub mod error;
pub mod firestore;
pub mod memory;
pub mod path;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use path::CollectionPath;
pub use store::{Document, DocumentStore, Fields, OrderDirection};
