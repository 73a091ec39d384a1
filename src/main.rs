use clap::Parser;
use miette::{IntoDiagnostic, Result};
use p2p_ledger::application::Ledger;
use p2p_ledger::config::{LedgerConfig, Report};
use p2p_ledger::interfaces::csv::command_reader::CommandReader;
use p2p_ledger::interfaces::csv::report_writer::ReportWriter;
use p2p_ledger::logging::init_logging;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger commands CSV file
    input: PathBuf,

    #[command(flatten)]
    config: LedgerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config);

    let store = cli.config.open_store()?;
    let ledger = Ledger::new(store);

    // Replay commands; a failing row is reported and skipped
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let (mut applied, mut failed) = (0usize, 0usize);
    for command in reader.commands() {
        match command {
            Ok(command) => match command.apply(&ledger).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    failed += 1;
                    eprintln!("Error processing command: {}", e);
                }
            },
            Err(e) => {
                failed += 1;
                eprintln!("Error reading command: {}", e);
            }
        }
    }
    info!(applied, failed, input = %cli.input.display(), "Batch finished");

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    match cli.config.report {
        Report::Accounts => writer.write_accounts(&ledger.accounts.find_all().await?)?,
        Report::Transfers => writer.write_transfers(&ledger.transfers.find_all().await?)?,
    }

    Ok(())
}
