mod basis;
mod cmd;
mod parse;
mod tax;

use clap::{Parser, Subcommand};

/// Cost basis and capital gains calculator for exchange transaction
/// exports.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capital gains report with short/long-term summary
    Report(cmd::report::ReportCommand),
    /// Ordinary income events valued at receipt
    Income(cmd::income::IncomeCommand),
    /// Remaining acquisition-lot inventory
    Lots(cmd::lots::LotsCommand),
    /// Compare FIFO, LIFO and HIFO outcomes
    Compare(cmd::compare::CompareCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Command::Report(cmd) => cmd.exec(),
        Command::Income(cmd) => cmd.exec(),
        Command::Lots(cmd) => cmd.exec(),
        Command::Compare(cmd) => cmd.exec(),
    }
}
