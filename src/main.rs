//! Thin CLI adapter around the accrual engine.
//!
//! Fetching events from a real chain indexer or GraphQL proxy is out of
//! scope for this crate (see the library's own docs), so this binary reads a
//! JSON fixture describing one [`InMemoryEventSource`] instead, the same
//! shape tests build in memory, just serialized. It's a small, disposable
//! I/O adapter in front of the library logic, nothing more.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use prettytable::{row, Table};

use tfgrid_minting::accrual::run_period;
use tfgrid_minting::event_source::InMemoryEventSource;
use tfgrid_minting::logger::FacadeLogger;
use tfgrid_minting::period::Period;

#[derive(Parser)]
#[command(author, version, about = "Replay ThreeFold Grid uptime accrual for one node", long_about = None)]
struct Cli {
    /// Node id to check.
    node_id: u32,
    /// Minting period offset (see tfgrid_minting::period::Period).
    period_offset: i64,
    /// Path to a JSON fixture describing the event source.
    #[arg(short, long)]
    fixture: PathBuf,
    /// Optional path to write the credit log as CSV.
    #[arg(short, long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let fixture_json = fs::read_to_string(&cli.fixture)?;
    let source: InMemoryEventSource = serde_json::from_str(&fixture_json)?;
    let period = Period::from_offset(cli.period_offset);

    let mut logger = FacadeLogger;
    let node = run_period(&source, cli.node_id, period, &mut logger)?;

    println!(
        "Node {}, period {} ({} {})",
        node.id, period.offset, period.month, period.year
    );
    println!(
        "Total uptime: {}s, total downtime: {}s, boot violations: {}",
        node.uptime, node.downtime, node.boot_duration_violations
    );
    println!();

    let mut table = Table::new();
    table.add_row(row!["Date", "Timestamp", "Credited", "Elapsed", "Downtime", "Note"]);
    for record in &node.events {
        table.add_row(row![
            record.date(),
            record.timestamp,
            record.credited,
            record.elapsed,
            record.downtime,
            record.note,
        ]);
    }
    table.printstd();

    if let Some(csv_path) = cli.csv {
        let file = fs::File::create(&csv_path)?;
        tfgrid_minting::csv_export::write_credit_log(file, &node.events)?;
        println!("\nWrote credit log to {}", csv_path.display());
    }

    Ok(())
}
