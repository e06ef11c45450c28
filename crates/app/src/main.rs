//! stockflow: command-line front end for batch allocation.
//!
//! ```sh
//! export DATABASE_URL=sqlite://stock.db
//!
//! stockflow add-batch warehouse-1 SMALL-TABLE 100
//! stockflow add-batch shipment-7 SMALL-TABLE 50 --eta 2025-01-01
//! stockflow allocate order-42 SMALL-TABLE 10     # prints the chosen batch
//! stockflow deallocate order-42 SMALL-TABLE 10 warehouse-1
//! stockflow list
//! stockflow lines
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use stockflow_allocation::{BatchSnapshot, OrderLine};
use stockflow_core::{BatchRef, OrderId, Sku};
use stockflow_infra::repository::{
    migrate, BatchRepository, OrderLineRepository, SqliteBatchRepository, SqliteOrderLineRepository,
};
use stockflow_infra::{services, DatabaseConfig};
use stockflow_observability::LogFormat;

/// Allocate order lines to stock batches.
#[derive(Parser, Debug)]
#[command(name = "stockflow", version, about)]
struct Cli {
    /// Database URL (overrides DATABASE_URL).
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Human-readable logs instead of JSON.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a batch of stock.
    AddBatch {
        reference: BatchRef,
        sku: Sku,
        quantity: i64,
        /// Expected arrival (YYYY-MM-DD); omit for stock already in the warehouse.
        #[arg(long)]
        eta: Option<NaiveDate>,
    },
    /// Allocate an order line and print the chosen batch reference.
    Allocate {
        order_id: OrderId,
        sku: Sku,
        quantity: i64,
    },
    /// Release an order line from a batch.
    Deallocate {
        order_id: OrderId,
        sku: Sku,
        quantity: i64,
        reference: BatchRef,
    },
    /// Print every batch as JSON.
    List,
    /// Print every recorded order line as JSON.
    Lines,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.pretty {
        stockflow_observability::init_with(LogFormat::Pretty);
    } else {
        stockflow_observability::init();
    }

    let mut config = DatabaseConfig::from_env();
    if let Some(url) = cli.database_url {
        config.url = url;
    }

    let pool = config
        .connect()
        .await
        .with_context(|| format!("failed to connect to {}", config.url))?;
    migrate(&pool).await.context("failed to migrate schema")?;

    let batches = SqliteBatchRepository::new(pool.clone());
    let lines = SqliteOrderLineRepository::new(pool);

    match cli.command {
        Command::AddBatch {
            reference,
            sku,
            quantity,
            eta,
        } => {
            services::add_batch(reference, sku, quantity, eta, &batches)
                .await
                .context("failed to add batch")?;
        }
        Command::Allocate {
            order_id,
            sku,
            quantity,
        } => {
            // Saving the chosen batch records the order line; a failed
            // allocation writes nothing.
            let line = OrderLine::new(order_id, sku, quantity)?;
            let chosen = services::allocate(&line, &batches)
                .await
                .with_context(|| format!("failed to allocate order {}", line.order_id()))?;
            println!("{chosen}");
        }
        Command::Deallocate {
            order_id,
            sku,
            quantity,
            reference,
        } => {
            let line = OrderLine::new(order_id, sku, quantity)?;
            services::deallocate(&line, &reference, &batches)
                .await
                .with_context(|| format!("failed to deallocate from {reference}"))?;
        }
        Command::List => {
            let snapshots: Vec<BatchSnapshot> = batches
                .list()
                .await
                .context("failed to list batches")?
                .iter()
                .map(|b| b.snapshot())
                .collect();
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        }
        Command::Lines => {
            let recorded = lines.list().await.context("failed to list order lines")?;
            println!("{}", serde_json::to_string_pretty(&recorded)?);
        }
    }

    Ok(())
}
