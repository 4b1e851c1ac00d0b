//! Output module for analysing a harvested metadata file
//!
//! This module handles:
//! - Computing statistics from the metadata file
//! - Printing them to the terminal
//! - Exporting them as a markdown summary

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{compute_statistics, load_statistics, print_statistics, MetadataStatistics};

use crate::config::Config;
use crate::storage::StorageResult;

/// Loads statistics for the configured metadata file and writes the markdown summary
///
/// # Arguments
///
/// * `config` - Configuration naming the metadata and summary paths
///
/// # Returns
///
/// * `Ok(MetadataStatistics)` - The statistics that were written
/// * `Err(StorageError)` - Reading the metadata or writing the summary failed
pub fn export_summary(config: &Config) -> StorageResult<MetadataStatistics> {
    let stats = load_statistics(&config.output.metadata_path)?;
    generate_markdown_summary(
        &stats,
        &config.output.metadata_path,
        &config.output.summary_path,
    )?;
    Ok(stats)
}
