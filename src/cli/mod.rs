//! CLI Module
//!
//! Command-line interface: `sonar-cli <filename> [module] [partition_count]`.

pub mod commands;

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::backend::BackendKind;

/// Sonar - byte-to-tone data sonification and reconstruction
#[derive(Parser, Debug)]
#[command(name = "sonar-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to analyze, or a .wav container to reconstruct
    pub filename: PathBuf,

    /// Analysis module
    #[arg(value_enum, default_value_t = Module::Hex)]
    pub module: Module,

    /// Number of partitions [default: 4]
    #[arg(value_parser = parse_partition_count)]
    pub partition_count: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for sonification artifacts and reconstructions
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Playback backend
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Module {
    /// Hexadecimal display
    Hex,
    /// Text preview with readable characters
    Text,
    /// Character class counts
    Count,
    /// Encode partitions as tones
    Sonar,
    /// Reconstruct data from sonification artifacts
    Dsonar,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Module::Hex => "hex",
            Module::Text => "text",
            Module::Count => "count",
            Module::Sonar => "sonar",
            Module::Dsonar => "dsonar",
        };
        f.write_str(name)
    }
}

fn parse_partition_count(value: &str) -> Result<usize, String> {
    let count: usize = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if count == 0 {
        return Err("partition count must be at least 1".to_string());
    }
    Ok(count)
}
