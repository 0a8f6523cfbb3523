//! Scan configuration.
//!
//! Result-file naming and the standard deviation divisor drifted between
//! benchmark campaigns, so both are fixed here once per run instead of being
//! baked into the aggregator.

/// Number of metric rows a complete YCSB result file carries.
pub const EXPECTED_ROWS: usize = 38;

/// Divisor used by the standard deviation reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdDivisor {
    /// n - 1 (Bessel's correction).
    #[default]
    Sample,
    /// n.
    Population,
}

/// How an instance id is derived from a result filename.
///
/// The extension is removed first, then the last `strip_segments`
/// underscore-delimited segments. A stem with too few segments is kept whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceIdRule {
    pub strip_segments: usize,
}

impl Default for InstanceIdRule {
    fn default() -> Self {
        Self { strip_segments: 1 }
    }
}

impl InstanceIdRule {
    pub fn derive(&self, filename: &str) -> String {
        let stem = match filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => filename,
        };

        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() <= self.strip_segments {
            return stem.to_string();
        }
        parts[..parts.len() - self.strip_segments].join("_")
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Substring a filename must contain to be treated as a result file.
    pub suffix: String,
    /// Filenames containing any of these markers are never data files.
    pub excluded: Vec<String>,
    pub id_rule: InstanceIdRule,
    pub std_divisor: StdDivisor,
    pub expected_rows: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            suffix: ".txt".to_string(),
            excluded: vec!["timestamp".to_string()],
            id_rule: InstanceIdRule::default(),
            std_divisor: StdDivisor::default(),
            expected_rows: EXPECTED_ROWS,
        }
    }
}

impl ScanConfig {
    pub fn recognizes(&self, filename: &str) -> bool {
        filename.contains(&self.suffix) && !self.excluded.iter().any(|m| filename.contains(m))
    }
}
