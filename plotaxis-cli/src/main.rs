use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use plotaxis::classify::{classify, AutotypeNumbers, ClassifyOptions};
use plotaxis::{Datum, Figure};

/// Compute chart axes (types, ranges, ticks) from JSON figures
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the axis pipeline on a figure and print the computed axes as JSON
    Axes {
        /// Path to a JSON figure: {"data": [...], "layout": {...}}
        file_path: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print the figure with the computed ranges written back instead of the axes
        #[arg(long)]
        layout: bool,
    },

    /// Print the axis type a JSON array of values would be given
    Classify {
        /// Path to a JSON array
        file_path: String,

        /// Only count actual numbers as numeric, not numeric strings
        #[arg(long)]
        strict: bool,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn run_axes(path: &Path, pretty: bool, layout: bool) -> Result<()> {
    let mut figure: Figure = read_json(path)?;
    let axes = figure.compute_axes()?;
    info!("computed {} axes in {} subplots", axes.axes.len(), axes.subplots.len());

    let value = if layout {
        serde_json::to_value(&figure)?
    } else {
        serde_json::to_value(&axes)?
    };
    let out = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{out}");
    Ok(())
}

fn run_classify(path: &Path, strict: bool) -> Result<()> {
    let data: Vec<Datum> = read_json(path)?;
    let opts = ClassifyOptions {
        autotype_numbers: if strict {
            AutotypeNumbers::Strict
        } else {
            AutotypeNumbers::ConvertTypes
        },
        ..Default::default()
    };
    println!("{}", classify(&data, &opts));
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Axes {
            file_path,
            pretty,
            layout,
        } => run_axes(Path::new(&file_path), pretty, layout),
        Commands::Classify { file_path, strict } => run_classify(Path::new(&file_path), strict),
    };

    if let Err(err) = &result {
        error!("{err:#}");
    }
    result
}
