use crate::schema::MetricKey;

/// A single metric line from a YCSB result file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub operation: String,
    pub event: String,
    pub value: f64,
}

impl RawRecord {
    pub fn key(&self) -> MetricKey {
        MetricKey::new(&self.operation, &self.event)
    }
}
