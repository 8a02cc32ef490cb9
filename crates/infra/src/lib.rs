//! Infrastructure: store implementations and cross-crate wiring.
//!
//! The domain crates define the persistence boundary; this crate provides
//! the in-memory implementations and the integration tests that exercise
//! the whole engine through them.

pub mod memory;

pub use memory::{
    InMemoryLotStore, InMemoryMovementStore, InMemoryProductCatalog, InMemoryUserDirectory,
};
