//! Columnar scan results: the per-instance metric table and the error log.

use crate::error::FileRejection;
use crate::log::RawRecord;
use crate::schema::{MetricKey, MetricSchema};
use std::collections::BTreeMap;

/// One metric column; `values[i]` belongs to `InstanceTable::instance[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: MetricKey,
    pub values: Vec<f64>,
}

/// Metric values of every valid result file, one row per file.
///
/// All columns (including `instance`) always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceTable {
    instance: Vec<String>,
    columns: Vec<Column>,
    index: BTreeMap<MetricKey, usize>,
}

impl InstanceTable {
    /// Empty table with one column per schema key, in schema order.
    pub fn with_schema(schema: &MetricSchema) -> Self {
        let columns: Vec<Column> = schema
            .keys()
            .iter()
            .map(|key| Column {
                key: key.clone(),
                values: Vec::new(),
            })
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.clone(), i))
            .collect();

        Self {
            instance: Vec::new(),
            columns,
            index,
        }
    }

    /// Append one file's records as a row.
    ///
    /// The row is only committed once every column has exactly one value;
    /// otherwise the table is left untouched.
    pub fn push_row(
        &mut self,
        instance: &str,
        records: &[RawRecord],
    ) -> Result<(), FileRejection> {
        let mut slots: Vec<Option<f64>> = vec![None; self.columns.len()];
        let mut unexpected = Vec::new();
        for rec in records {
            let key = rec.key();
            match self.index.get(&key) {
                Some(&i) if slots[i].is_none() => slots[i] = Some(rec.value),
                Some(_) => return Err(FileRejection::DuplicateMetric(key.to_string())),
                None => unexpected.push(key.to_string()),
            }
        }

        let missing: Vec<String> = self
            .columns
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(col, _)| col.key.to_string())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(FileRejection::SchemaMismatch {
                missing,
                unexpected,
            });
        }

        for (col, value) in self.columns.iter_mut().zip(slots.into_iter().flatten()) {
            col.values.push(value);
        }
        self.instance.push(instance.to_string());
        Ok(())
    }

    /// The `instance` column: source instance id per row.
    pub fn instances(&self) -> &[String] {
        &self.instance
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &MetricKey) -> Option<&[f64]> {
        self.index
            .get(key)
            .map(|&i| self.columns[i].values.as_slice())
    }

    /// Number of rows (valid instances).
    pub fn len(&self) -> usize {
        self.instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_empty()
    }
}

/// Instance id -> filenames rejected for that instance.
///
/// Every instance id seen during a scan has an entry, so the log doubles as a
/// complete roster; instances with only valid files map to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLog {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorLog {
    /// Make sure `instance` is on the roster.
    pub fn touch(&mut self, instance: &str) {
        self.entries.entry(instance.to_string()).or_default();
    }

    pub fn record(&mut self, instance: &str, filename: &str) {
        self.entries
            .entry(instance.to_string())
            .or_default()
            .push(filename.to_string());
    }

    pub fn get(&self, instance: &str) -> Option<&[String]> {
        self.entries.get(instance).map(|v| v.as_slice())
    }

    /// Entries sorted by instance id.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    /// Total number of rejected files across all instances.
    pub fn rejected_files(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}
