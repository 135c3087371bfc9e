pub mod error;
pub mod pool;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{Result, RotationError};
pub use pool::{default_pool, parse_pool, read_pool_file, DEFAULT_POOL};
pub use store::RotationStore;
pub use types::{CycleStats, Item, UsageRecord};
