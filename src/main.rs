//! debtweb main entry point

use anyhow::Context;
use clap::Parser;
use debtweb_api::start_server;
use debtweb_config::Config;
use debtweb_core::{import_rules, DebtBook};
use debtweb_importer::{DebtImporterTrait, ImporterRef, SpreadsheetDebtImporter};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "debtweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight debt installment tracker fed from a hand-maintained spreadsheet", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Parse this workbook, print its installments as JSON and exit
    #[arg(short, long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[{}] {}", e.code(), e);
            for suggestion in e.suggestions() {
                eprintln!("  - {}", suggestion);
            }
            anyhow::bail!("invalid configuration in {}", args.config.display());
        }
    };

    init_logging(&config.logging.level);
    info!(
        "Config loaded: data path={}, workbook={}",
        config.data.path.display(),
        config.data.workbook_file
    );

    let importer: ImporterRef = Arc::new(SpreadsheetDebtImporter::new(import_rules(&config.import)));
    let rt = Runtime::new()?;

    rt.block_on(async {
        if let Some(path) = args.import {
            let records = importer
                .import_file(path.clone())
                .await
                .with_context(|| format!("cannot import {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        let book = match DebtBook::load(&config, &importer).await {
            Ok(book) => book,
            Err(e) => {
                error!("{}", e.to_details());
                return Err(e).context("cannot open the debt store");
            }
        };
        info!("Debt store ready with {} debts", book.len());

        start_server(config, Arc::new(RwLock::new(book)), importer).await?;
        Ok::<(), anyhow::Error>(())
    })
}
