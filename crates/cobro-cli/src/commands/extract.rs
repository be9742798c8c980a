//! Extract command - pull invoice fields out of a single document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use cobro_core::{DocumentExtractor, ExtractedInvoice, RecordSet, StatusClassifier};

use super::config;
use super::sources::extract_document;
use super::OutputFormat;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document (pdf or txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let extractor = DocumentExtractor::new()
        .with_classifier(StatusClassifier::from_config(&config.vocabulary));
    let invoice = extract_document(&args.input, &extractor)?;

    let output = format_invoice(&invoice, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    let missing = invoice.missing_fields();
    if !missing.is_empty() {
        eprintln!(
            "{} Fields not found: {}",
            style("ℹ").blue(),
            missing.join(", ")
        );
    }

    Ok(())
}

fn format_invoice(invoice: &ExtractedInvoice, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(invoice)?)),
        OutputFormat::Csv => Ok(RecordSet::from_records([invoice.to_record()]).to_csv()?),
        OutputFormat::Text => Ok(format!(
            "Invoice: {}\nClient:  {}\nStatus:  {}\nAmount:  {}\n",
            invoice.invoice_number, invoice.client, invoice.status, invoice.amount
        )),
        OutputFormat::Xlsx => anyhow::bail!("Workbook output is only available for classify"),
    }
}
