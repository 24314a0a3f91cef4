//! CLI Command Implementations
//!
//! Implements the actual logic for each module.

use std::path::Path;

use log::{info, warn};

use super::{Cli, Module};
use crate::artifacts::ArtifactLayout;
use crate::config::SonarConfig;
use crate::error::{Result, SonarError};
use crate::inspect::{self, CharStats};
use crate::partition::{PartitionedFile, DEFAULT_PARTITION_COUNT};
use crate::reconstruct::{PartitionOutcome, Reconstructor};
use crate::sonify::Sonifier;

/// Build the effective configuration: file (if any), then flags
pub fn resolve_config(cli: &Cli) -> Result<SonarConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            SonarConfig::load(path)?
        }
        None => SonarConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    config.validate()?;

    Ok(config)
}

/// Run the selected module
pub fn run(cli: &Cli, config: &SonarConfig) -> Result<()> {
    info!("Running {} on {}", cli.module, cli.filename.display());

    match cli.module {
        Module::Dsonar if is_container(&cli.filename) => dsonar_container(&cli.filename, config),
        Module::Dsonar => dsonar_batch(&cli.filename, cli.partition_count, config),
        module => {
            let partition_count = cli.partition_count.unwrap_or(DEFAULT_PARTITION_COUNT);
            let file = PartitionedFile::open(&cli.filename, partition_count)?;
            println!(
                "File: {} ({} bytes, {} partitions of {} bytes)",
                cli.filename.display(),
                file.len(),
                file.partition_count(),
                file.partition_size()
            );
            println!();

            match module {
                Module::Hex => hex(&file),
                Module::Text => text(&file),
                Module::Count => count(&file),
                _ => sonar(&file, config)?,
            }
            Ok(())
        }
    }
}

/// Hex dump of every partition
pub fn hex(file: &PartitionedFile) {
    for (index, bytes) in file.partitions() {
        println!("=== Partition {} Hex View ===", index);
        print!("{}", inspect::hex_dump(bytes));
        println!();
    }
}

/// Text preview of every partition
pub fn text(file: &PartitionedFile) {
    for (index, bytes) in file.partitions() {
        println!("=== Partition {} Text Preview ===", index);
        println!("Text content: {}", inspect::text_preview(bytes));
        println!();
    }
}

/// Character class counts of every partition
pub fn count(file: &PartitionedFile) {
    for (index, bytes) in file.partitions() {
        let stats = CharStats::count(bytes);
        println!("=== Partition {} Character Analysis ===", index);
        println!("Letters:     {}", stats.letters);
        println!("Digits:      {}", stats.digits);
        println!("Spaces:      {}", stats.spaces);
        println!("Punctuation: {}", stats.punctuation);
        println!("Others:      {}", stats.others);
        println!("Total chars: {}", stats.total());
        println!();
    }
}

/// Sonify every partition
pub fn sonar(file: &PartitionedFile, config: &SonarConfig) -> Result<()> {
    let sonifier = Sonifier::new(
        ArtifactLayout::new(&config.output_dir),
        config.encode,
        config.backend,
    )
    .with_master_volume(config.master_volume)
    .with_pacing(config.pacing);

    for (index, bytes) in file.partitions() {
        println!("=== Partition {} Sonar ===", index);
        let summary = sonifier.sonify_partition(index, bytes)?;
        for artifact in &summary.artifacts {
            println!("Audio saved to: {}", artifact.display());
        }
        println!();
    }

    Ok(())
}

/// Reconstruct a single audio container
pub fn dsonar_container(path: &Path, config: &SonarConfig) -> Result<()> {
    println!("=== Direct Container-to-Data Reconstruction ===");
    println!("Input container: {}", path.display());
    println!();

    let reconstructor = Reconstructor::new(ArtifactLayout::new(&config.output_dir), config.decode);
    let (result, output) = reconstructor.reconstruct_container_file(path)?;

    result.print_report("Container");
    println!("Output: {}", output.display());
    Ok(())
}

/// Reconstruct every partition from the artifact directory and combine
///
/// When `original` exists it is partitioned the same way and used to
/// validate each reconstructed partition.
pub fn dsonar_batch(original: &Path, partition_count: Option<usize>, config: &SonarConfig) -> Result<()> {
    let layout = ArtifactLayout::new(&config.output_dir);
    let count = match partition_count {
        Some(count) => count,
        None => match layout.discover_partition_count() {
            0 => DEFAULT_PARTITION_COUNT,
            found => {
                info!("Found artifacts for {} partitions", found);
                found
            }
        },
    };

    let reference = if original.is_file() {
        Some(PartitionedFile::open(original, count)?)
    } else {
        info!("{} not found, skipping validation", original.display());
        None
    };

    println!("=== Reconstructing {} partitions ===", count);
    println!();

    let combined_output = layout.combined_output(original);
    let reconstructor = Reconstructor::new(layout, config.decode);
    let outcome = reconstructor.reconstruct_batch(count, reference.as_ref(), &combined_output)?;

    println!();
    for entry in &outcome.partitions {
        if let PartitionOutcome::Failed { partition, error } = entry {
            println!("Partition {} failed: {}", partition, error);
        }
    }

    let Some(combined) = &outcome.combined else {
        return Err(SonarError::EmptyResult {
            context: format!("{} partitions", count),
        });
    };

    println!(
        "Complete file reconstructed: {} ({} bytes from {} partitions)",
        combined.output.display(),
        combined.bytes_written,
        combined.included.len()
    );
    if !outcome.success {
        warn!(
            "{} of {} partitions could not be reconstructed",
            outcome.failed_count(),
            count
        );
    }

    Ok(())
}

fn is_container(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}
