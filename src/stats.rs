//! Per-metric summary statistics over an instance table.

use crate::model::InstanceTable;
use crate::schema::{MetricKey, StdDivisor};

/// One statistic for one metric; None when undefined for the column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub metric: MetricKey,
    pub value: Option<f64>,
}

/// Mean, median and standard deviation, each in table column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub mean: Vec<SummaryRow>,
    pub median: Vec<SummaryRow>,
    pub std: Vec<SummaryRow>,
}

/// Reduce every metric column. The `instance` column is never reduced.
///
/// Non-finite values (`NaN`, `inf`) are skipped by every reducer, so all three
/// statistics always describe the same set of values.
pub fn summarize(table: &InstanceTable, divisor: StdDivisor) -> Summary {
    let mut summary = Summary {
        mean: Vec::new(),
        median: Vec::new(),
        std: Vec::new(),
    };

    for col in table.columns() {
        let row = |value| SummaryRow {
            metric: col.key.clone(),
            value,
        };
        summary.mean.push(row(mean(&col.values)));
        summary.median.push(row(median(&col.values)));
        summary.std.push(row(std_dev(&col.values, divisor)));
    }

    summary
}

/// The values a reducer looks at.
pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let values = finite(values);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value; the average of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = finite(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn std_dev(values: &[f64], divisor: StdDivisor) -> Option<f64> {
    let values = finite(values);
    let n = values.len();
    let denom = match divisor {
        StdDivisor::Sample if n < 2 => return None,
        StdDivisor::Sample => (n - 1) as f64,
        StdDivisor::Population if n == 0 => return None,
        StdDivisor::Population => n as f64,
    };

    let m = mean(&values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / denom).sqrt())
}
