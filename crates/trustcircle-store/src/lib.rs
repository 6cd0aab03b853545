//! # Trust Circle Store
//!
//! The persistence boundary for Trust Circles. Provides a trait-based
//! interface for member, circle, key, trustee and signature records, with an
//! in-memory reference implementation.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`MemoryStore`] - In-memory storage, used by tests and embedders
//! - [`StoreError`] - Storage failures; converts into the core `Error`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trustcircle_store::{MemoryStore, Store};
//! use trustcircle_perms::NewCircle;
//!
//! async fn example() {
//!     let store = MemoryStore::new();
//!     let board = NewCircle::create("board").unwrap();
//!
//!     let circle = store.insert_circle(&board.circle).await.unwrap();
//!     assert!(circle.added > 0);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Timestamps**: Inserts assign `added` and `altered`; updates refresh `altered`
//! - **Uniqueness**: Duplicate names and grants fail with `Constraint`
//! - **Counter guard**: A stale or repeated signature write fails instead of resetting the count
//! - **Circle creation**: Circle, first key and owner grant are written together

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use traits::Store;
