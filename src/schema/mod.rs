//! Schema layer: metric identity, the expected per-file metric set, and the
//! knobs that vary between benchmark campaigns.
//!
//! This module is intentionally separate from line parsing and aggregation.
//! It owns:
//! - MetricKey (one measured metric, `"{operation}, {event}"`)
//! - MetricSchema (the fixed key set every valid file must carry)
//! - ScanConfig (suffix filter, instance id rule, sd divisor)

pub mod config;
pub mod key;
pub mod metrics;

pub use config::{InstanceIdRule, ScanConfig, StdDivisor};
pub use key::MetricKey;
pub use metrics::MetricSchema;
