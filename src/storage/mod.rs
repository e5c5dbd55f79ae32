pub mod collection;
pub mod engine;
pub mod memory;
pub mod persistence;
pub mod query;
pub mod update;

pub use collection::CollectionHandle;
pub use engine::{DeleteResult, DocumentStore, InsertOneResult, UpdateResult};
pub use memory::InMemoryStore;
pub use persistence::{DatabaseSnapshot, SnapshotManager, load_seed};
pub use query::{Condition, FindOptions, Filter, SortDirection, SortSpec};
pub use update::{Update, UpdateOptions};
