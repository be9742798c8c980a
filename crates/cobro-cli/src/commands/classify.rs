//! Classify command - partition invoices into paid, partial and unpaid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use cobro_core::export::write_workbook;
use cobro_core::ingest::TableReader;
use cobro_core::models::config::UndeterminedPolicy;
use cobro_core::{
    Classification, ClassificationEngine, ClassificationError, DocumentExtractor, RecordSet,
    StatusClassifier,
};

use super::config;
use super::sources::{expand_inputs, load_source};
use super::OutputFormat;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input files or glob patterns (csv, tsv, json, xlsx, xls, ods, pdf, txt)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Directory for exported partitions
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep undetermined statuses out of the partial partition
    #[arg(long)]
    separate_undetermined: bool,

    /// Column to read payment status from
    #[arg(long)]
    status_column: Option<String>,

    /// Skip inputs that fail to load instead of aborting
    #[arg(long)]
    continue_on_error: bool,
}

pub fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = config::load(config_path)?;
    if args.separate_undetermined {
        config.classification.undetermined = UndeterminedPolicy::Separate;
    }
    if let Some(column) = &args.status_column {
        config.classification.status_column = Some(column.clone());
    }

    match (args.format, &args.output_dir) {
        (OutputFormat::Csv, None) => {
            anyhow::bail!("CSV output writes one file per partition; use --output-dir")
        }
        (OutputFormat::Xlsx, None) => {
            anyhow::bail!("Workbook output is written to a file; use --output-dir")
        }
        _ => {}
    }

    let files = expand_inputs(&args.inputs)?;
    debug!("Classifying {} input files", files.len());

    let reader = TableReader::from_config(&config.ingest);
    let extractor = DocumentExtractor::new()
        .with_classifier(StatusClassifier::from_config(&config.vocabulary));

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut sets = Vec::with_capacity(files.len());
    let mut failed = Vec::new();
    for path in &files {
        match load_source(path, &reader, &extractor) {
            Ok(set) => sets.push(set),
            Err(e) if args.continue_on_error => {
                warn!("Failed to load {}: {}", path.display(), e);
                failed.push((path.clone(), e.to_string()));
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                anyhow::bail!("Loading {} failed: {}", path.display(), e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let records = RecordSet::concat(sets);
    let engine = ClassificationEngine::from_config(&config);

    let result = match engine.classify(&records) {
        Ok(result) => result,
        Err(ClassificationError::NoClassificationBasis { columns }) => {
            anyhow::bail!(
                "Cannot classify: no total or status column found. Columns: [{}]",
                columns.join(", ")
            );
        }
    };

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)?;
            match &args.output_dir {
                Some(dir) => {
                    fs::create_dir_all(dir)?;
                    let path = dir.join("classification.json");
                    fs::write(&path, json)?;
                    println!("{} Output written to {}", style("✓").green(), path.display());
                }
                None => println!("{}", json),
            }
        }
        OutputFormat::Csv => {
            // Checked above.
            if let Some(dir) = &args.output_dir {
                write_partitions(&result, dir)?;
            }
        }
        OutputFormat::Xlsx => {
            if let Some(dir) = &args.output_dir {
                fs::create_dir_all(dir)?;
                let path = dir.join("classification.xlsx");
                write_workbook(&result, &path)?;
                println!("{} Workbook written to {}", style("✓").green(), path.display());
            }
        }
        OutputFormat::Text => {
            print!("{}", format_summary(&result));
            if let Some(dir) = &args.output_dir {
                write_partitions(&result, dir)?;
            }
        }
    }

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            eprintln!("  - {}: {}", path.display(), error);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Write one CSV file per partition into `dir`.
fn write_partitions(result: &Classification, dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;

    for (name, set) in result.named_partitions() {
        let path = dir.join(format!("{}.csv", name));
        set.write_csv(fs::File::create(&path)?)?;
        debug!("Wrote {} rows to {}", set.len(), path.display());
    }

    println!(
        "{} Partitions written to {}",
        style("✓").green(),
        dir.display()
    );
    Ok(())
}

fn format_summary(result: &Classification) -> String {
    let counts = result.counts();
    let mut output = String::new();

    output.push_str(&format!("Mode: {}\n", result.mode));
    for (role, column) in [
        ("Total", &result.columns.total),
        ("Paid", &result.columns.paid),
        ("Outstanding", &result.columns.outstanding),
        ("Status", &result.columns.status),
    ] {
        if let Some(column) = column {
            output.push_str(&format!("  {:<12} {}\n", role, column));
        }
    }
    output.push('\n');

    output.push_str(&format!("Paid:         {}\n", style(counts.paid).green()));
    output.push_str(&format!("Partial:      {}\n", style(counts.partial).yellow()));
    output.push_str(&format!("Unpaid:       {}\n", style(counts.unpaid).red()));
    if counts.unclassified > 0 {
        output.push_str(&format!("Unclassified: {}\n", counts.unclassified));
    }

    if counts.total() == 0 {
        output.push_str("\nNo invoices found in the inputs.\n");
    }

    output
}
