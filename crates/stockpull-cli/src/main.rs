mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stockpull_core::{
    CategorySelector, LocationId, PipelineRequest, PricelistId, DEFAULT_LOCATION_ID,
    DEFAULT_PRICELIST_ID,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stockpull")]
#[command(about = "Export priced Odoo stock as JSON, a Google spreadsheet or an xlsx order")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the stock report as pretty JSON
    Stock(RunArgs),
    /// Copy the template spreadsheet, fill it and print its URL
    Sheet(RunArgs),
    /// Fill the local xlsx order template and save it
    Xlsx(XlsxArgs),
}

/// Pipeline parameters shared by every subcommand.
#[derive(Debug, Clone, Args, PartialEq, Eq)]
struct RunArgs {
    /// Stock location to read quants from
    #[arg(long, default_value_t = DEFAULT_LOCATION_ID)]
    location: LocationId,

    /// Price list used to price each product
    #[arg(long, default_value_t = DEFAULT_PRICELIST_ID)]
    pricelist: PricelistId,

    /// Restrict to a configured category subtree (none, a or b)
    #[arg(long, default_value_t = CategorySelector::None)]
    category: CategorySelector,
}

#[derive(Debug, Clone, Args, PartialEq, Eq)]
struct XlsxArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Where to write the filled workbook
    #[arg(long, short, default_value = stockpull_sheets::XLSX_FILE_NAME)]
    output: PathBuf,
}

impl From<RunArgs> for PipelineRequest {
    fn from(args: RunArgs) -> Self {
        Self {
            location_id: args.location,
            pricelist_id: args.pricelist,
            category: args.category,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = stockpull_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Stock(args) => export::run_stock(&config, args.into()).await,
        Commands::Sheet(args) => export::run_sheet(&config, args.into()).await,
        Commands::Xlsx(args) => export::run_xlsx(&config, args.run.into(), &args.output).await,
    }
}

#[cfg(test)]
mod tests;
