//! In-memory object store: locked storage, blocking waiters and counters.

pub mod config;
pub mod notifier;
pub mod stats;
pub mod store;

pub use config::StoreConfig;
pub use notifier::WaitMode;
pub use stats::{Stats, StatsSnapshot};
pub use store::{ObjectStore, UNBOUNDED};
