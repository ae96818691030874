use clap::Parser;
use miette::{IntoDiagnostic, Result};
use railbook::application::engine::{BookingEngine, EngineConfig};
use railbook::domain::catalog::{Station, Train};
use railbook::domain::ports::{
    BookingLedgerBox, IdempotencyStoreBox, PaymentGatewayBox, RefundNotifierBox,
};
use railbook::infrastructure::in_memory::{
    InMemoryCatalog, InMemoryIdempotencyStore, InMemoryLedger, InMemoryRefundLog,
};
#[cfg(feature = "storage-rocksdb")]
use railbook::infrastructure::rocksdb::RocksDBStore;
use railbook::infrastructure::simulated::SimulatedGateway;
use railbook::interfaces::json::{Command, CommandReader, JsonLinesWriter};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog JSON file (stations and trains)
    catalog: PathBuf,

    /// Booking commands, one JSON document per line
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Simulated gateway processing delay in milliseconds
    #[arg(long, default_value_t = 0)]
    payment_delay_ms: u64,

    /// Payment timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    payment_timeout_ms: u64,

    /// Make the simulated gateway decline every charge
    #[arg(long)]
    decline_payments: bool,
}

#[derive(Deserialize)]
struct CatalogFile {
    stations: Vec<Station>,
    trains: Vec<Train>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(cli: &Cli) -> Result<(BookingLedgerBox, IdempotencyStoreBox)> {
    if let Some(db_path) = &cli.db_path {
        // RocksDB backs both the ledger and the idempotency records.
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        Ok((Box::new(store.clone()), Box::new(store)))
    } else {
        Ok((
            Box::new(InMemoryLedger::new()),
            Box::new(InMemoryIdempotencyStore::new()),
        ))
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(_cli: &Cli) -> Result<(BookingLedgerBox, IdempotencyStoreBox)> {
    Ok((
        Box::new(InMemoryLedger::new()),
        Box::new(InMemoryIdempotencyStore::new()),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let catalog_file = File::open(&cli.catalog).into_diagnostic()?;
    let catalog: CatalogFile = serde_json::from_reader(catalog_file).into_diagnostic()?;

    let (ledger, idempotency) = open_stores(&cli)?;

    let delay = Duration::from_millis(cli.payment_delay_ms);
    let gateway: PaymentGatewayBox = if cli.decline_payments {
        Box::new(SimulatedGateway::declining(delay))
    } else {
        Box::new(SimulatedGateway::approving(delay))
    };
    let refunds: RefundNotifierBox = Box::new(InMemoryRefundLog::new());

    let engine = BookingEngine::new(
        Box::new(InMemoryCatalog::new(catalog.stations, catalog.trains)),
        ledger,
        idempotency,
        gateway,
        refunds,
        EngineConfig {
            payment_timeout: Duration::from_millis(cli.payment_timeout_ms),
        },
    );

    let input = File::open(&cli.input).into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = JsonLinesWriter::new(stdout.lock());

    for command in CommandReader::new(input).commands() {
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error reading command: {e}");
                continue;
            }
        };

        let written = match command {
            Command::Submit(request) => match engine.submit(request).await {
                Ok(booking) => writer.write(&booking),
                Err(e) => {
                    eprintln!("Error submitting booking: {e}");
                    Ok(())
                }
            },
            Command::Cancel {
                booking_id,
                user_id,
            } => match engine.cancel(booking_id, &user_id).await {
                Ok(booking) => writer.write(&booking),
                Err(e) => {
                    eprintln!("Error cancelling booking {booking_id}: {e}");
                    Ok(())
                }
            },
            Command::Search {
                source,
                destination,
                date,
            } => {
                use chrono::Datelike;
                let day = date.weekday().into();
                match engine.search_trains(&source, &destination, day).await {
                    Ok(trains) => writer.write(&trains),
                    Err(e) => {
                        eprintln!("Error searching trains: {e}");
                        Ok(())
                    }
                }
            }
            Command::ListBookings { user_id } => match engine.list_by_user(&user_id).await {
                Ok(bookings) => writer.write(&bookings),
                Err(e) => {
                    eprintln!("Error listing bookings: {e}");
                    Ok(())
                }
            },
            Command::ListStations => match engine.stations().await {
                Ok(stations) => writer.write(&stations),
                Err(e) => {
                    eprintln!("Error listing stations: {e}");
                    Ok(())
                }
            },
        };
        written.into_diagnostic()?;
    }

    Ok(())
}
