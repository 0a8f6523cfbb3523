use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod error;
mod experiment;
mod log;
mod model;
mod output;
mod render;
mod schema;
mod stats;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "benchstat")]
#[command(about = "Benchmark log statistics and variant comparison", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate one directory of result files into df/mean/median/std/errors CSVs.
    Stats {
        #[arg(short = 'd', long)]
        directory: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Run `stats` for every variant sub-directory and render a comparison report.
    Compare {
        #[arg(short = 'd', long)]
        directory: PathBuf,

        /// Variant sub-directories to compare (default: all, sorted).
        #[arg(long = "source")]
        sources: Vec<String>,

        #[arg(short = 'o', long, default_value = "report.html")]
        out: String,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Turn raw `ps` snapshot logs into tab-separated per-instance tables.
    CleanPs {
        #[arg(short = 'd', long)]
        directory: PathBuf,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Substring identifying result files.
    #[arg(long, default_value = ".txt")]
    suffix: String,

    /// Extra filename marker to skip, on top of "timestamp" (repeatable).
    #[arg(long = "exclude")]
    excluded: Vec<String>,

    /// Underscore-delimited segments stripped from a filename stem to get the instance id.
    #[arg(long, default_value_t = 1)]
    strip_segments: usize,

    /// Use the population standard deviation (divisor n) instead of the sample one.
    #[arg(long)]
    population: bool,
}

impl ScanArgs {
    fn into_config(self) -> schema::ScanConfig {
        let mut excluded = schema::ScanConfig::default().excluded;
        for marker in self.excluded {
            if !excluded.contains(&marker) {
                excluded.push(marker);
            }
        }

        schema::ScanConfig {
            suffix: self.suffix,
            excluded,
            id_rule: schema::InstanceIdRule {
                strip_segments: self.strip_segments,
            },
            std_divisor: if self.population {
                schema::StdDivisor::Population
            } else {
                schema::StdDivisor::Sample
            },
            ..schema::ScanConfig::default()
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Stats { directory, scan } => {
            let config = scan.into_config();

            // 1) Scan + reduce + persist.
            let outcome = experiment::process_directory(&directory, &config)?;
            println!(
                "Scanned {} ({} instances, {} rejected files)",
                directory.display(),
                outcome.table.len(),
                outcome.errors.rejected_files()
            );
        }
        Commands::Compare {
            directory,
            sources,
            out,
            scan,
        } => {
            let config = scan.into_config();

            // 1) Resolve variants.
            let sources = if sources.is_empty() {
                experiment::discover_sources(&directory)?
            } else {
                sources
            };
            if sources.is_empty() {
                anyhow::bail!("no variant directories found under {}", directory.display());
            }

            // 2) Per-variant pipeline.
            let runs = experiment::run_sources(&directory, &sources, &config)?;

            // 3) Long-form observations.
            let observations = experiment::observations(&runs);
            let obs_path = directory.join(experiment::OBSERVATIONS_FILE);
            output::write_atomic(&obs_path, &experiment::observations_csv(&observations)?)?;
            println!("Wrote {}", obs_path.display());

            // 4) Render HTML.
            let data = experiment::build_report_data(&runs);
            let html = render::render_html_report(&data)?;
            let out_path = directory.join(&out);
            output::write_atomic(&out_path, html.as_bytes())?;
            println!("Wrote {}", out_path.display());
        }
        Commands::CleanPs { directory } => {
            for path in log::ps::clean_ps_directory(&directory)? {
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}
