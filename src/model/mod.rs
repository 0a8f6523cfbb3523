//! Aggregation model: fold a directory of result files into an instance
//! table and an error log.

pub mod failures;
pub mod table;

pub use failures::{ErrorRecord, error_report};
pub use table::{ErrorLog, InstanceTable};

use crate::error::{FileRejection, ScanError};
use crate::log::parse_result_text;
use crate::schema::{MetricKey, MetricSchema, ScanConfig};

use std::fs;
use std::path::Path;

/// Result of one directory scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub table: InstanceTable,
    pub errors: ErrorLog,
    /// Schema pinned by the first valid file; None if no file was valid.
    pub schema: Option<MetricSchema>,
    /// Recognized result files, valid or not.
    pub files_seen: usize,
}

/// Scan `dir` for result files and aggregate them.
///
/// Performs, per recognized file (sorted by name):
/// - reject on wrong row count or any unparseable line (whole file)
/// - pin the metric schema from the first valid file, reject later mismatches
/// - append valid rows to the table; record rejected filenames per instance
pub fn scan_directory(dir: &Path, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::MissingDirectory(dir.to_path_buf()));
    }

    let listing = fs::read_dir(dir).map_err(|source| ScanError::Listing {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = listing
        .filter_map(|entry| entry.ok())
        // Follows symlinks, so linked result files are scanned too.
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| config.recognizes(name))
        .collect();
    names.sort();

    let mut out = ScanOutcome::default();
    for name in &names {
        out.files_seen += 1;
        let instance = config.id_rule.derive(name);

        match accept_file(&dir.join(name), &instance, config, &mut out) {
            Ok(()) => {
                out.errors.touch(&instance);
                tracing::debug!(file = %name, instance = %instance, "accepted result file");
            }
            Err(reason) => {
                out.errors.record(&instance, name);
                tracing::warn!(file = %name, instance = %instance, %reason, "rejected result file");
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        files = out.files_seen,
        valid = out.table.len(),
        rejected = out.errors.rejected_files(),
        "scanned result directory"
    );

    Ok(out)
}

/// Validate one file and append it to the table as `instance`.
///
/// The table only changes when the whole file is accepted.
fn accept_file(
    path: &Path,
    instance: &str,
    config: &ScanConfig,
    out: &mut ScanOutcome,
) -> Result<(), FileRejection> {
    let text =
        fs::read_to_string(path).map_err(|e| FileRejection::Unreadable(e.to_string()))?;
    let records = parse_result_text(&text, config.expected_rows)?;
    let keys: Vec<MetricKey> = records.iter().map(|r| r.key()).collect();

    match &out.schema {
        Some(schema) => schema.check(&keys)?,
        None => {
            let schema = MetricSchema::pin(&keys)?;
            out.table = InstanceTable::with_schema(&schema);
            out.schema = Some(schema);
        }
    }

    out.table.push_row(instance, &records)
}
