//! Application Services
//!
//! Services shared between use cases and driver adapters.
//!
//! - `DispatchStats`: Running dispatch counters for health reporting

mod dispatch_stats;

pub use dispatch_stats::{DispatchStats, DispatchStatsSnapshot};
