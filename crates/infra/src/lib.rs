//! Infrastructure layer: the `ObjectStore` seam, its in-memory and
//! (feature-gated) S3-backed implementations, and the generic repository
//! built on top of it (spec §4.4, §4.5).

pub mod memory;
pub mod prefixed;
pub mod repository;
pub mod store;

#[cfg(feature = "s3")]
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use prefixed::PrefixedObjectStore;
pub use repository::{DocumentRecord, ObjectStoreRepository, Page, Precondition, RepoItem};
pub use store::{ListedObject, ObjectMeta, ObjectPage, ObjectStore, ObjectStoreError, StoredObject};

#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
