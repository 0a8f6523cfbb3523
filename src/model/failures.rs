//! Error report: one record per instance id with its rejected files.

use crate::model::table::ErrorLog;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub index: usize,
    pub instance_id: String,
    pub count: usize,
    pub filenames: Vec<String>,
}

/// Flatten the error log into report rows, sorted by instance id.
///
/// Instances without failures are kept (count 0) so the report lists the full
/// roster.
pub fn error_report(log: &ErrorLog) -> Vec<ErrorRecord> {
    log.iter()
        .enumerate()
        .map(|(index, (instance_id, filenames))| ErrorRecord {
            index,
            instance_id: instance_id.clone(),
            count: filenames.len(),
            filenames: filenames.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorted_roster_with_counts() {
        let mut log = ErrorLog::default();
        log.record("i2_b", "i2_b_2.txt");
        log.touch("i1_a");
        log.record("i2_b", "i2_b_1.txt");

        assert_eq!(
            error_report(&log),
            vec![
                ErrorRecord {
                    index: 0,
                    instance_id: "i1_a".to_string(),
                    count: 0,
                    filenames: vec![],
                },
                ErrorRecord {
                    index: 1,
                    instance_id: "i2_b".to_string(),
                    count: 2,
                    filenames: vec!["i2_b_2.txt".to_string(), "i2_b_1.txt".to_string()],
                },
            ]
        );
    }

    #[test]
    fn empty_log_gives_empty_report() {
        assert!(error_report(&ErrorLog::default()).is_empty());
    }
}
