pub mod aggregator;
pub mod sync;

pub use aggregator::{fold_stats, PlatformAggregator};
pub use sync::{PlatformSyncService, SyncResult};
