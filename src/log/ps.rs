//! Cleaning for periodic `ps` snapshots.
//!
//! A raw log repeats one block per sampling tick: a timestamp line followed by
//! one indented line per benchmarked instance (`  PID %CPU %MEM ...`), with
//! `ps` header lines sprinkled in. The instance count comes from the filename
//! prefix (`i3_...` => 3 instances).

use crate::Result;
use crate::output;

use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INSTANCE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^i(\d+)_").expect("static regex"));

pub const CLEANED_PREFIX: &str = "cleaned";

/// Tab-separated table produced from one `ps` log.
#[derive(Debug, Clone, PartialEq)]
pub struct PsTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PsTable {
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header.join("\t"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Instance count encoded in a `ps` log filename, if any.
pub fn instance_count(filename: &str) -> Option<usize> {
    INSTANCE_PREFIX_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Turn raw `ps` log text into a table of pid/cpu/mem columns per instance.
pub fn clean_ps_text(text: &str, instances: usize) -> PsTable {
    let mut header = vec!["timestamp".to_string()];
    for i in 1..=instances {
        header.push(format!("i{}_pid", i));
        header.push(format!("i{}_cpu", i));
        header.push(format!("i{}_mem", i));
    }

    let lines: Vec<&str> = text.lines().filter(|l| !l.contains("PID")).collect();

    let mut rows = Vec::new();
    for block in lines.chunks(1 + instances) {
        let mut row = vec![block[0].trim_end().to_string()];
        for line in &block[1..] {
            if !line.starts_with(' ') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                tracing::warn!(line = %line, "ps line has fewer than 3 fields, skipping");
                continue;
            }
            row.extend(fields[..3].iter().map(|f| f.to_string()));
        }

        if row.len() > 1 {
            rows.push(row);
        }
    }

    PsTable { header, rows }
}

/// Clean every `ps` log in `dir`, writing `cleaned_<name>` next to it.
///
/// Inputs are never rewritten. Returns the paths written.
pub fn clean_ps_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("ps log directory {} does not exist", dir.display());
    }

    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("list ps log directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| !name.starts_with(CLEANED_PREFIX))
        .collect();
    names.sort();

    let mut written = Vec::new();
    for name in names {
        let Some(instances) = instance_count(&name) else {
            tracing::warn!(file = %name, "no i<N>_ prefix, cannot tell instance count; skipping");
            continue;
        };

        let path = dir.join(&name);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("read ps log {}", path.display()))?;
        let table = clean_ps_text(&text, instances);

        let out = dir.join(format!("{}_{}", CLEANED_PREFIX, name));
        output::write_atomic(&out, table.to_tsv().as_bytes())?;
        tracing::info!(file = %name, instances, rows = table.rows.len(), "cleaned ps log");
        written.push(out);
    }

    Ok(written)
}
