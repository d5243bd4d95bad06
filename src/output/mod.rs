//! Output module for crawl reports and exports
//!
//! This module handles:
//! - Rendering a crawl result as a markdown report
//! - Exporting the full crawl result as JSON
//! - Displaying stored statistics for an organization

mod markdown;
pub mod stats;

pub use markdown::{format_crawl_report, write_crawl_report};
pub use stats::{format_statistics, load_statistics, print_statistics};

use crate::state::CrawlResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes the complete crawl result as pretty-printed JSON
///
/// # Arguments
///
/// * `result` - The crawl result to export
/// * `output_path` - Path where the JSON file should be written
pub fn write_json(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
