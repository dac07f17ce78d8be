//! Persistent key-value storage for the session.
//!
//! `KeyValueStore` is the seam to whatever survives a reload (browser local
//! storage, a directory on disk, memory in tests). `SessionStore` layers the
//! three typed session keys on top of it.
//!
//! The store is last-write-wins with no locking; concurrent writers may race.

pub mod error;
pub mod file;
pub mod memory;
pub mod session_store;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use session_store::{SessionStore, REMEMBER_KEY, SESSION_KEY, USER_KEY};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
