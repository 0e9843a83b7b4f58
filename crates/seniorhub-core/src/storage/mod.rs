//! Session persistence.
//!
//! This module provides:
//! - `KeyValueStore`: the storage capability, with `FileStore`, `KeyringStore`
//!   and `MemoryStore` backends
//! - `StorageService`: best-effort JSON save/load/remove under fixed keys
//! - `AuthStorage` and `HouseholdStorage`: typed accessors for the three keys
//!
//! Nothing here surfaces an error to the caller. Failures are logged and
//! treated as "no data".

pub mod auth;
pub mod error;
pub mod household;
pub mod keychain;
pub mod service;
pub mod store;

pub use auth::AuthStorage;
pub use error::StorageError;
pub use household::HouseholdStorage;
pub use keychain::KeyringStore;
pub use service::{StorageKey, StorageService};
pub use store::{FileStore, KeyValueStore, MemoryStore};
