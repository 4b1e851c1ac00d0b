//! Statistics generation from the metadata file
//!
//! Works purely on a previously written metadata file. Nothing here touches
//! the network.

use crate::model::NOT_AVAILABLE;
use crate::storage::{parse_rows, StorageError, StorageResult, HEADER, HEADER_LINE};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Number of authors kept in the ranking
pub const TOP_AUTHORS: usize = 10;

const TITLE: usize = 0;
const YEAR: usize = 1;
const AUTHORS: usize = 2;

/// Metadata file statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStatistics {
    /// Data rows, duplicates included
    pub total_rows: usize,

    /// Empty or `N/A` cells per column, in header order
    pub missing_values: Vec<(String, usize)>,

    /// Rows whose Year is not an integer, as (title, raw year)
    pub invalid_years: Vec<(String, String)>,

    /// Row count per valid year, ascending
    pub rows_per_year: BTreeMap<i32, usize>,

    /// Most frequent authors, most frequent first; ties broken by name
    pub top_authors: Vec<(String, usize)>,

    /// Distinct non-missing titles
    pub unique_titles: usize,
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell == NOT_AVAILABLE
}

/// Computes statistics from metadata file contents
///
/// Rows shorter than the header are treated as having missing trailing cells.
///
/// # Returns
///
/// * `Ok(MetadataStatistics)` - Successfully computed statistics
/// * `Err(StorageError::InvalidHeader)` - The first row is not the expected header
pub fn compute_statistics(text: &str, path: &Path) -> StorageResult<MetadataStatistics> {
    let mut rows = parse_rows(text).into_iter();

    let header = rows.next().unwrap_or_default();
    if header.iter().map(String::as_str).ne(HEADER.iter().copied()) {
        return Err(StorageError::InvalidHeader {
            path: path.to_path_buf(),
            expected: HEADER_LINE.to_string(),
            found: header.join(","),
        });
    }

    let mut stats = MetadataStatistics::default();
    let mut missing = [0usize; HEADER.len()];
    let mut titles = HashSet::new();
    let mut authors: HashMap<String, usize> = HashMap::new();

    for row in rows {
        stats.total_rows += 1;
        let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or("");

        for (column, count) in missing.iter_mut().enumerate() {
            if is_missing(cell(column)) {
                *count += 1;
            }
        }

        let year = cell(YEAR).trim();
        match year.parse::<i32>() {
            Ok(year) => *stats.rows_per_year.entry(year).or_default() += 1,
            Err(_) => stats
                .invalid_years
                .push((cell(TITLE).to_string(), year.to_string())),
        }

        if !is_missing(cell(TITLE)) {
            titles.insert(cell(TITLE).to_string());
        }

        if !is_missing(cell(AUTHORS)) {
            for author in cell(AUTHORS).split(',').map(str::trim) {
                if !author.is_empty() {
                    *authors.entry(author.to_string()).or_default() += 1;
                }
            }
        }
    }

    stats.missing_values = HEADER
        .iter()
        .zip(missing)
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    stats.unique_titles = titles.len();

    let mut ranking: Vec<_> = authors.into_iter().collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranking.truncate(TOP_AUTHORS);
    stats.top_authors = ranking;

    Ok(stats)
}

/// Loads statistics from a metadata file on disk
///
/// # Arguments
///
/// * `path` - The metadata file to analyse
///
/// # Returns
///
/// * `Ok(MetadataStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - The file could not be read or has the wrong header
pub fn load_statistics(path: &Path) -> StorageResult<MetadataStatistics> {
    let text = std::fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    compute_statistics(&text, path)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &MetadataStatistics) {
    println!("=== Metadata Statistics ===\n");

    println!("Missing Data:");
    for (column, count) in &stats.missing_values {
        println!("  {}: {}", column, count);
    }
    println!();

    if !stats.invalid_years.is_empty() {
        println!("Rows with invalid 'Year' values:");
        for (title, year) in &stats.invalid_years {
            println!("  {:?} (Year: {:?})", title, year);
        }
        println!();
    }

    println!("Papers per Year:");
    for (year, count) in &stats.rows_per_year {
        println!("  {}: {}", year, count);
    }
    println!();

    println!("Top {} Authors:", TOP_AUTHORS);
    for (author, count) in &stats.top_authors {
        println!("  {}: {}", author, count);
    }
    println!();

    println!("Total number of unique papers: {}", stats.unique_titles);
    println!(
        "Total number of papers (including duplicates): {}",
        stats.total_rows
    );
}
