//! Flat-file persistence for scan results.
//!
//! Files produced per scanned directory:
//! - df.csv      full instance table, with header
//! - mean.csv    `metric,value`, headerless (also median.csv, std.csv)
//! - errors.csv  error report, fixed quoted header
//!
//! Every file goes through a temp file in the target directory and is then
//! renamed over the destination.

use crate::Result;
use crate::model::{ErrorRecord, InstanceTable};
use crate::stats::{Summary, SummaryRow};

use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const TABLE_FILE: &str = "df.csv";
pub const MEAN_FILE: &str = "mean.csv";
pub const MEDIAN_FILE: &str = "median.csv";
pub const STD_FILE: &str = "std.csv";
pub const ERRORS_FILE: &str = "errors.csv";

const ERRORS_HEADER: &str = ",\"instance_id\",\"count\",\"filenames\"\n";

/// Write `bytes` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write temp file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("rename temp file onto {}", path.display()))?;
    Ok(())
}

pub fn table_csv(table: &InstanceTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut wtr = csv::Writer::from_writer(&mut buf);

    let mut header = vec![String::new(), "instance".to_string()];
    header.extend(table.columns().iter().map(|c| c.key.to_string()));
    wtr.write_record(&header)?;

    for (row, instance) in table.instances().iter().enumerate() {
        let mut record = vec![row.to_string(), instance.clone()];
        record.extend(table.columns().iter().map(|c| c.values[row].to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    drop(wtr);

    Ok(buf)
}

pub fn summary_csv(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut wtr = csv::Writer::from_writer(&mut buf);
    for row in rows {
        let value = row.value.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([row.metric.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    drop(wtr);

    Ok(buf)
}

pub fn errors_csv(records: &[ErrorRecord]) -> Result<Vec<u8>> {
    let mut buf = ERRORS_HEADER.as_bytes().to_vec();
    {
        let mut wtr = csv::Writer::from_writer(&mut buf);
        for rec in records {
            wtr.write_record([
                rec.index.to_string(),
                rec.instance_id.clone(),
                rec.count.to_string(),
                rec.filenames.join(";"),
            ])?;
        }
        wtr.flush()?;
    }
    Ok(buf)
}

/// Persist one directory's table, summaries and error report into `dir`.
pub fn write_scan_outputs(
    dir: &Path,
    table: &InstanceTable,
    summary: &Summary,
    errors: &[ErrorRecord],
) -> Result<Vec<PathBuf>> {
    let files: [(&str, Vec<u8>); 5] = [
        (TABLE_FILE, table_csv(table)?),
        (MEAN_FILE, summary_csv(&summary.mean)?),
        (MEDIAN_FILE, summary_csv(&summary.median)?),
        (STD_FILE, summary_csv(&summary.std)?),
        (ERRORS_FILE, errors_csv(errors)?),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, bytes) in files {
        let path = dir.join(name);
        write_atomic(&path, &bytes)?;
        written.push(path);
    }
    Ok(written)
}
