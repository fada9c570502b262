//! Local cart persistence for anonymous sessions.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{DEFAULT_STORAGE_KEY, LocalCartStore};
