//! The metric set every valid result file must carry.
//!
//! The set is pinned by the first valid file of a scan and then enforced on
//! every later file. Columns are never grown or padded: a file whose keys
//! differ is rejected.

use crate::error::FileRejection;
use crate::schema::MetricKey;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSchema {
    /// Column order: first-seen order of the pinning file.
    keys: Vec<MetricKey>,
    set: BTreeSet<MetricKey>,
}

impl MetricSchema {
    /// Pin a schema from one file's keys (in file order).
    pub fn pin(keys: &[MetricKey]) -> Result<Self, FileRejection> {
        let set = distinct(keys)?;
        Ok(Self {
            keys: keys.to_vec(),
            set,
        })
    }

    /// Validate one file's keys against the pinned set; order is irrelevant.
    pub fn check(&self, keys: &[MetricKey]) -> Result<(), FileRejection> {
        let found = distinct(keys)?;
        if found == self.set {
            return Ok(());
        }

        let missing = self
            .set
            .difference(&found)
            .map(|k| k.to_string())
            .collect();
        let unexpected = found
            .difference(&self.set)
            .map(|k| k.to_string())
            .collect();
        Err(FileRejection::SchemaMismatch {
            missing,
            unexpected,
        })
    }

    pub fn keys(&self) -> &[MetricKey] {
        &self.keys
    }
}

fn distinct(keys: &[MetricKey]) -> Result<BTreeSet<MetricKey>, FileRejection> {
    let mut set = BTreeSet::new();
    for key in keys {
        if !set.insert(key.clone()) {
            return Err(FileRejection::DuplicateMetric(key.to_string()));
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(names: &[&str]) -> Vec<MetricKey> {
        names.iter().map(|n| MetricKey::from(*n)).collect()
    }

    #[test]
    fn accepts_same_set_in_any_order() {
        let schema = MetricSchema::pin(&keys(&["A, x", "B, y"])).unwrap();
        assert!(schema.check(&keys(&["B, y", "A, x"])).is_ok());
        assert_eq!(schema.keys(), keys(&["A, x", "B, y"]).as_slice());
    }

    #[test]
    fn reports_missing_and_unexpected() {
        let schema = MetricSchema::pin(&keys(&["A, x", "B, y"])).unwrap();
        let err = schema.check(&keys(&["A, x", "C, z"])).unwrap_err();
        assert_eq!(
            err,
            FileRejection::SchemaMismatch {
                missing: vec!["B, y".to_string()],
                unexpected: vec!["C, z".to_string()],
            }
        );
    }

    #[test]
    fn rejects_duplicates() {
        let err = MetricSchema::pin(&keys(&["A, x", "A, x"])).unwrap_err();
        assert_eq!(err, FileRejection::DuplicateMetric("A, x".to_string()));
    }
}
