#![forbid(unsafe_code)]

pub mod blob;
pub mod local;
pub mod repository;

pub use blob::{BlobError, BlobStore, InMemoryBlobStore, TransferProgress};
pub use local::LocalFileStore;
pub use repository::{ConfigRepository, InMemoryRepository, Storage, StorageError};
