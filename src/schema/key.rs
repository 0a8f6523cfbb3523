//! Metric identity used as column name across result files.
//!
//! Example result line: `[READ], AverageLatency(us), 412.3`
//! =>  MetricKey("READ, AverageLatency(us)")
//!
//! We store the joined string and derive ordering so it can be used in BTreeSet/Map.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey(pub String);

impl MetricKey {
    pub fn new(operation: &str, event: &str) -> Self {
        Self(format!("{}, {}", operation, event))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins_operation_and_event() {
        let key = MetricKey::new("OVERALL", "RunTime(ms)");
        assert_eq!(key.as_str(), "OVERALL, RunTime(ms)");
        assert_eq!(key, MetricKey::from("OVERALL, RunTime(ms)"));
    }
}
