//! Experiment comparison: run the scan pipeline once per variant directory
//! (docker, unikernel allocators, ...) and line the variants up for charts.

use crate::Result;
use crate::model::{self, ScanOutcome};
use crate::output;
use crate::schema::{MetricKey, ScanConfig, StdDivisor};
use crate::stats;

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const OBSERVATIONS_FILE: &str = "observations.csv";

const RUNTIME: &str = "OVERALL, RunTime(ms)";

/// A fixed chart: one bar group per metric, one bar per source.
struct Panel {
    title: &'static str,
    y_label: &'static str,
    metrics: &'static [(&'static str, &'static str)],
}

macro_rules! latency_panel {
    ($title:literal, $op:literal) => {
        Panel {
            title: $title,
            y_label: "μs",
            metrics: &[
                (concat!($op, ", AverageLatency(us)"), "average latency"),
                (concat!($op, ", MinLatency(us)"), "min latency"),
                (concat!($op, ", MaxLatency(us)"), "max latency"),
                (concat!($op, ", 95thPercentileLatency(us)"), "95th percentile latency"),
                (concat!($op, ", 99thPercentileLatency(us)"), "99th percentile latency"),
            ],
        }
    };
}

const PANELS: &[Panel] = &[
    Panel {
        title: "Overall runtime",
        y_label: "ms",
        metrics: &[(RUNTIME, "total runtime")],
    },
    Panel {
        title: "Overall throughput",
        y_label: "ops/sec",
        metrics: &[("OVERALL, Throughput(ops/sec)", "operations")],
    },
    latency_panel!("Read operations", "READ"),
    latency_panel!("Cleanup operations", "CLEANUP"),
    latency_panel!("Insert operations", "INSERT"),
];

/// Scan results for one variant directory.
#[derive(Debug, Clone)]
pub struct SourceRun {
    pub source: String,
    pub outcome: ScanOutcome,
}

/// Long-form row: one metric value of one instance of one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub source: String,
    pub observation: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarView {
    pub mean: f64,
    /// Sample standard deviation; None with fewer than 2 instances.
    pub sd: Option<f64>,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub source: String,
    /// Parallel to `ChartView::labels`; None where the source lacks the metric.
    pub bars: Vec<Option<BarView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub series: Vec<SeriesView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceView {
    pub source: String,
    pub files: usize,
    pub instances: usize,
    pub rejected_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub sources: Vec<SourceView>,
    pub charts: Vec<ChartView>,
}

/// Scan one directory, reduce it, and persist the CSV outputs next to the
/// inputs.
pub fn process_directory(dir: &Path, config: &ScanConfig) -> Result<ScanOutcome> {
    let outcome = model::scan_directory(dir, config)?;
    let summary = stats::summarize(&outcome.table, config.std_divisor);
    let report = model::error_report(&outcome.errors);

    for path in output::write_scan_outputs(dir, &outcome.table, &summary, &report)? {
        tracing::debug!(path = %path.display(), "wrote scan output");
    }

    Ok(outcome)
}

/// Immediate sub-directories of `root`, sorted by name.
pub fn discover_sources(root: &Path) -> Result<Vec<String>> {
    let mut sources: Vec<String> = fs::read_dir(root)
        .with_context(|| format!("list experiment root {}", root.display()))?
        .filter_map(|entry| entry.ok())
        // Follows symlinks, so linked variant directories count too.
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Run `process_directory` for every `root/<source>`.
///
/// Sources whose directory is missing are skipped with a warning.
pub fn run_sources(
    root: &Path,
    sources: &[String],
    config: &ScanConfig,
) -> Result<Vec<SourceRun>> {
    let mut runs = Vec::new();
    for source in sources {
        let dir = root.join(source);
        if !dir.is_dir() {
            tracing::warn!(
                source = %source,
                dir = %dir.display(),
                "source directory missing, skipping"
            );
            continue;
        }
        let outcome = process_directory(&dir, config)
            .with_context(|| format!("process source {}", source))?;
        runs.push(SourceRun {
            source: source.clone(),
            outcome,
        });
    }
    Ok(runs)
}

/// Flatten every source's table to long form.
///
/// Runtime observations come first, then every other metric in first-seen
/// column order; within a metric, sources keep their run order.
pub fn observations(runs: &[SourceRun]) -> Vec<Observation> {
    let mut order = vec![MetricKey::from(RUNTIME)];
    for run in runs {
        for col in run.outcome.table.columns() {
            if !order.contains(&col.key) {
                order.push(col.key.clone());
            }
        }
    }

    let mut out = Vec::new();
    for key in &order {
        for run in runs {
            let Some(values) = run.outcome.table.column(key) else {
                continue;
            };
            out.extend(values.iter().map(|v| Observation {
                source: run.source.clone(),
                observation: key.to_string(),
                value: *v,
            }));
        }
    }
    out
}

pub fn observations_csv(rows: &[Observation]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut wtr = csv::Writer::from_writer(&mut buf);
    wtr.write_record(["source", "observation", "value"])?;
    for row in rows {
        let value = row.value.to_string();
        wtr.write_record([row.source.as_str(), row.observation.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    drop(wtr);
    Ok(buf)
}

/// Build the fixed chart panels from the per-source tables.
pub fn build_report_data(runs: &[SourceRun]) -> ReportData {
    let sources = runs
        .iter()
        .map(|run| SourceView {
            source: run.source.clone(),
            files: run.outcome.files_seen,
            instances: run.outcome.table.len(),
            rejected_files: run.outcome.errors.rejected_files(),
        })
        .collect();

    let charts = PANELS
        .iter()
        .map(|panel| ChartView {
            title: panel.title.to_string(),
            y_label: panel.y_label.to_string(),
            labels: panel.metrics.iter().map(|(_, label)| label.to_string()).collect(),
            series: runs
                .iter()
                .map(|run| SeriesView {
                    source: run.source.clone(),
                    bars: panel
                        .metrics
                        .iter()
                        .map(|(key, _)| bar(&run.outcome, key))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    ReportData { sources, charts }
}

fn bar(outcome: &ScanOutcome, key: &str) -> Option<BarView> {
    let values = outcome.table.column(&MetricKey::from(key))?;
    Some(BarView {
        mean: stats::mean(values)?,
        // Error bars are always the sample sd, whatever the CSV divisor.
        sd: stats::std_dev(values, StdDivisor::Sample),
        n: stats::finite(values).len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::RawRecord;
    use crate::model::InstanceTable;
    use crate::schema::MetricSchema;
    use pretty_assertions::assert_eq;

    fn record(key: &str, value: f64) -> RawRecord {
        let (operation, event) = key.split_once(", ").unwrap();
        RawRecord {
            operation: operation.to_string(),
            event: event.to_string(),
            value,
        }
    }

    fn run(source: &str, rows: &[&[(&str, f64)]]) -> SourceRun {
        let keys: Vec<MetricKey> = rows[0].iter().map(|(k, _)| MetricKey::from(*k)).collect();
        let schema = MetricSchema::pin(&keys).unwrap();
        let mut table = InstanceTable::with_schema(&schema);
        for (i, row) in rows.iter().enumerate() {
            let recs: Vec<RawRecord> = row.iter().map(|(k, v)| record(k, *v)).collect();
            table.push_row(&format!("{}_{}", source, i), &recs).unwrap();
        }
        SourceRun {
            source: source.to_string(),
            outcome: ScanOutcome {
                table,
                schema: Some(schema),
                ..ScanOutcome::default()
            },
        }
    }

    fn obs(source: &str, observation: &str, value: f64) -> Observation {
        Observation {
            source: source.to_string(),
            observation: observation.to_string(),
            value,
        }
    }

    #[test]
    fn runtime_observations_come_first() {
        let runs = vec![
            run("docker", &[&[("READ, Operations", 10.0), (RUNTIME, 100.0)]]),
            run("unikernel", &[&[(RUNTIME, 80.0), ("READ, Operations", 12.0)]]),
        ];

        assert_eq!(
            observations(&runs),
            vec![
                obs("docker", RUNTIME, 100.0),
                obs("unikernel", RUNTIME, 80.0),
                obs("docker", "READ, Operations", 10.0),
                obs("unikernel", "READ, Operations", 12.0),
            ]
        );
    }

    #[test]
    fn observations_csv_has_header() {
        let csv = observations_csv(&[obs("docker", RUNTIME, 100.0)]).unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "source,observation,value\ndocker,\"OVERALL, RunTime(ms)\",100\n"
        );
    }

    #[test]
    fn runtime_chart_has_mean_and_sample_sd() {
        let runs = vec![run("docker", &[&[(RUNTIME, 100.0)], &[(RUNTIME, 300.0)]])];
        let data = build_report_data(&runs);

        assert_eq!(data.charts.len(), PANELS.len());
        let runtime = &data.charts[0];
        assert_eq!(runtime.labels, vec!["total runtime"]);
        let bar = runtime.series[0].bars[0].clone().unwrap();
        assert_eq!(bar.mean, 200.0);
        assert_eq!(bar.n, 2);
        assert!((bar.sd.unwrap() - 141.421356).abs() < 1e-5);

        // No READ metrics in this source: every read bar is absent.
        let read = &data.charts[2];
        assert_eq!(read.labels.len(), 5);
        assert!(read.series[0].bars.iter().all(Option::is_none));
    }

    #[test]
    fn processes_each_source_directory() {
        let root = tempfile::tempdir().unwrap();
        for source in ["docker", "unikernel_base"] {
            let dir = root.path().join(source);
            fs::create_dir(&dir).unwrap();
            let mut text = String::from("header\n");
            text.push_str(&format!("[{}], RunTime(ms), 1000\n", "OVERALL"));
            for i in 1..38 {
                text.push_str(&format!("[OP{}], Event, {}\n", i, i));
            }
            fs::write(dir.join(format!("{}_i1_run1.txt", source)), text).unwrap();
        }

        let sources = discover_sources(root.path()).unwrap();
        assert_eq!(sources, vec!["docker", "unikernel_base"]);

        let runs = run_sources(root.path(), &sources, &ScanConfig::default()).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].outcome.table.instances(), vec!["unikernel_base_i1"]);
        assert!(root.path().join("docker").join(output::TABLE_FILE).is_file());
        assert!(root.path().join("unikernel_base").join(output::ERRORS_FILE).is_file());
    }

    #[test]
    fn reprocessing_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        for (name, scale) in [("c_x_1.txt", 3), ("a_x_1.txt", 1), ("b_x_1.txt", 2)] {
            let mut text = String::from("header\n");
            for i in 0..38 {
                text.push_str(&format!("[OP{}], Event, {}\n", i, i * scale));
            }
            fs::write(dir.path().join(name), text).unwrap();
        }
        fs::write(dir.path().join("d_x_1.txt"), "header\n[OP0], Event, 1\n").unwrap();

        let outputs = [output::TABLE_FILE, output::MEAN_FILE, output::ERRORS_FILE];
        let read_all = || -> Vec<Vec<u8>> {
            outputs.iter().map(|name| fs::read(dir.path().join(name)).unwrap()).collect()
        };

        process_directory(dir.path(), &ScanConfig::default()).unwrap();
        let first = read_all();
        process_directory(dir.path(), &ScanConfig::default()).unwrap();
        let second = read_all();

        assert_eq!(first, second);
        assert!(String::from_utf8_lossy(&first[2]).contains("d_x,1,d_x_1.txt"));
    }
}
