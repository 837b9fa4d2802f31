use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use nimbus_io::{LabelWriter, SeriesReader};
use nimbus_sky::{classify, known_sky_types, ClassifyConfig};

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "Sky-condition classification of 1-min solar irradiance time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a CSV irradiance series and write the label series
    Classify {
        /// Input CSV file. Must have a column "times" with the UTC row
        /// timestamps or, alternatively, the columns "Year", "Month", "Day",
        /// "Hour", "Minute", "Second". In addition, the columns "sza",
        /// "eth", "ghi", "ghics" and "ghicda" are required, plus
        /// "longitude" unless mirroring is disabled.
        input: PathBuf,

        /// Output CSV file (same timestamp columns plus "sky_type")
        output: PathBuf,

        /// Disable GHI mirroring across sunrise/sunset
        #[arg(long)]
        no_mirroring: bool,

        /// Also write the Km, Kv and Kvf index columns
        #[arg(long)]
        full_output: bool,

        /// JSON file with threshold overrides (absent keys keep defaults)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SkyTypeCount {
    sky_type: &'static str,
    label: u8,
    count: usize,
}

#[derive(Serialize)]
struct ClassifyOutput {
    n_samples: usize,
    n_unknown: usize,
    counts: Vec<SkyTypeCount>,
    spurious_rounds: usize,
}

fn load_config(path: Option<&PathBuf>, no_mirroring: bool) -> Result<ClassifyConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ClassifyConfig::default(),
    };
    if no_mirroring {
        config = config.with_ghi_mirroring(false);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Classify {
            input,
            output,
            no_mirroring,
            full_output,
            config,
        } => {
            let config = load_config(config.as_ref(), no_mirroring)?;

            let loaded = SeriesReader::new(&input)
                .read()
                .context("failed to read input CSV")?;
            info!(n_samples = loaded.series.len(), "series loaded");

            let result = classify(&loaded.series, &config)
                .context("classification failed")?;

            LabelWriter::new(&output)
                .write(&loaded.series, &result, loaded.timestamp_format, full_output)
                .context("failed to write output CSV")?;
            info!(path = %output.display(), "labels written");

            let counts: Vec<SkyTypeCount> = known_sky_types()
                .map(|sky_type| SkyTypeCount {
                    sky_type: sky_type.name(),
                    label: sky_type.as_u8(),
                    count: result
                        .sky_type
                        .iter()
                        .filter(|&&label| label == sky_type)
                        .count(),
                })
                .collect();
            let n_known: usize = counts.iter().map(|c| c.count).sum();

            let summary = ClassifyOutput {
                n_samples: loaded.series.len(),
                n_unknown: loaded.series.len() - n_known,
                counts,
                spurious_rounds: result.spurious_rounds,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
