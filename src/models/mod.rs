// Data models
pub mod platform;
pub mod platform_stats;
pub mod stats;
pub mod user;

pub use platform::PlatformId;
pub use platform_stats::PlatformStats;
pub use stats::{AggregatedStats, SkillsAnalysis};
pub use user::{LinkedPlatform, User};
