//! Node Storage
//!
//! In-memory arena holding one document's nodes, with the parent/child
//! index that every other layer queries.

mod error;
mod node_store;

pub use error::StoreError;
pub use node_store::NodeStore;
