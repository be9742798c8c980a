//! CLI command implementations.

pub mod classify;
pub mod config;
pub mod extract;
mod sources;

/// Output format shared by the classify and extract commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV files, one per partition
    Csv,
    /// Plain text summary
    Text,
    /// Excel workbook, one sheet per partition
    Xlsx,
}
