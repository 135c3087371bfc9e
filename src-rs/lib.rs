pub mod config;

#[path = "rotation/lib.rs"]
pub mod rotation;
#[path = "api/lib.rs"]
pub mod api;

pub use config::ServerConfig;
pub use rotation::{CycleStats, Item, RotationError, RotationStore, UsageRecord};
