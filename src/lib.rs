// CodeTrack sync
// Fetches coding-platform statistics, aggregates them and keeps user documents current

pub mod api;
pub mod features;
pub mod models;
pub mod platforms;
pub mod store;
pub mod utils;

pub use features::{fold_stats, PlatformAggregator, PlatformSyncService, SyncResult};
pub use models::{AggregatedStats, LinkedPlatform, PlatformId, PlatformStats, User};
pub use platforms::{FetchContext, PlatformFetchers, StatsFetcher};
pub use store::{FieldUpdates, MemoryUserStore, StoreError, UserStore};
