//! Shop Ledger interactive prompt.
//!
//! Usage:
//!   shopledger --data ledger.txt
//!   shopledger --backend sqlite --data ledger.db
//!
//! Environment:
//!   SHOPLEDGER_DATA - Path of the ledger file or database (default: ledger.txt)
//!   SHOPLEDGER_BACKEND - `file` or `sqlite` (default: file)
//!   RUST_LOG - Log filter, logs go to stderr (default: warn)

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use shopledger::store::{FileStore, SqliteStore, Store};
use shopledger::{CorruptStatePolicy, Ledger, LedgerConfig, LedgerError, Response};

const HELP: &str = "commands: deposit,<amount> | purchase,<name>,<price>,<qty> | \
sale,<name>,<price>,<qty> | balance | list | product,<name> | history[,<start>[,<end>]] | \
check | quit";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    File,
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(name = "shopledger")]
#[command(about = "Shop Ledger - cash balance, inventory and action history")]
struct Args {
    /// Ledger file or SQLite database
    #[arg(long, env = "SHOPLEDGER_DATA", default_value = "ledger.txt")]
    data: PathBuf,

    /// Storage backend
    #[arg(long, env = "SHOPLEDGER_BACKEND", value_enum, default_value = "file")]
    backend: Backend,

    /// Refuse to start when the stored balance disagrees with the history
    #[arg(long)]
    strict_integrity: bool,

    /// Start with an empty ledger when the stored state cannot be read
    #[arg(long)]
    start_empty_on_corrupt: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let store: Box<dyn Store> = match args.backend {
        Backend::File => Box::new(FileStore::new(&args.data)),
        Backend::Sqlite => Box::new(
            SqliteStore::open(&args.data)
                .with_context(|| format!("opening database {}", args.data.display()))?,
        ),
    };

    let config = LedgerConfig {
        verify_on_open: true,
        strict_integrity: args.strict_integrity,
        corrupt_state: if args.start_empty_on_corrupt {
            CorruptStatePolicy::StartEmpty
        } else {
            CorruptStatePolicy::Fail
        },
    };

    let ledger = Ledger::open(store, config)
        .with_context(|| format!("opening ledger {}", args.data.display()))?;

    if let Some(report) = ledger.open_report().filter(|r| !r.is_clean()) {
        eprintln!("{}", Response::Integrity(report.clone()));
    }

    run(&ledger, io::stdin().lock(), io::stdout().lock())
}

fn run<S: Store>(ledger: &Ledger<S>, input: impl BufRead, mut out: impl Write) -> Result<()> {
    writeln!(out, "{HELP}")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        match ledger.execute(&line?) {
            Ok(Response::Quit) => {
                writeln!(out, "{}", Response::Quit)?;
                return Ok(());
            }
            Ok(response) => writeln!(out, "{response}")?,
            Err(LedgerError::Poisoned) => return Err(LedgerError::Poisoned.into()),
            Err(e @ LedgerError::NotPersisted { .. }) => writeln!(out, "warning: {e}")?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}
