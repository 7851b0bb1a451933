//! `swimid-store` — registry storage for the resolution engine.
//!
//! Loads curated registries from CSV and serves them to the engine through
//! the read-only [`IdentityStore`](swimid_engine::store::IdentityStore) seam.

pub mod csv;
pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
