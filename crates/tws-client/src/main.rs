// crates/tws-client/src/main.rs

//! Probe binary: connect, ask for the clock and the managed accounts, print
//! every callback until the connection ends or Ctrl-C is pressed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tws_client::{Client, ClientConfig};
use tws_core::{OrderStatus, TickAttrib, Wrapper};

#[derive(Parser)]
#[clap(name = "tws-probe")]
#[clap(about = "Connect to a trading terminal and print what it sends")]
struct Cli {
    /// TOML config file; environment variables are used when absent
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Terminal host (overrides config)
    #[clap(long)]
    host: Option<String>,

    /// Terminal port (overrides config)
    #[clap(short, long)]
    port: Option<u16>,

    /// Client id (overrides config)
    #[clap(long)]
    client_id: Option<i32>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

struct PrintWrapper;

impl Wrapper for PrintWrapper {
    fn connect_ack(&self) {
        println!("connected");
    }

    fn connection_closed(&self) {
        println!("connection closed");
    }

    fn error(&self, req_id: i32, error_time: i64, code: i32, message: &str, advanced: &str) {
        println!("error id={} time={} code={} {}", req_id, error_time, code, message);
        if !advanced.is_empty() {
            println!("  advanced reject: {}", advanced);
        }
    }

    fn interrupt_received(&self, count: u32) {
        println!(
            "interrupt {} (press more than {} times to stop)",
            count,
            tws_client::MAX_INTERRUPTS
        );
    }

    fn next_valid_id(&self, order_id: i32) {
        println!("next valid id {}", order_id);
    }

    fn managed_accounts(&self, accounts: &str) {
        println!("managed accounts {}", accounts);
    }

    fn current_time(&self, time: i64) {
        match chrono::DateTime::from_timestamp(time, 0) {
            Some(t) => println!("current time {} ({})", time, t),
            None => println!("current time {}", time),
        }
    }

    fn current_time_in_millis(&self, time_in_millis: i64) {
        println!("current time {} ms", time_in_millis);
    }

    fn tick_price(&self, ticker_id: i32, field: i32, price: f64, attrib: TickAttrib) {
        println!("tick price {} field={} {} {:?}", ticker_id, field, price, attrib);
    }

    fn tick_size(&self, ticker_id: i32, field: i32, size: f64) {
        println!("tick size {} field={} {}", ticker_id, field, size);
    }

    fn order_status(&self, status: &OrderStatus) {
        println!("order status {:?}", status);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::from_env()?,
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(client_id) = cli.client_id {
        config.client_id = client_id;
    }

    info!("Probing {}", config.socket_addr_string());

    let (host, port, client_id) = (config.host.clone(), config.port, config.client_id);
    let client = Arc::new(Client::new(Arc::new(PrintWrapper), config));
    client.connect(&host, port, client_id).await?;

    let interrupts = client.clone();
    tokio::spawn(async move {
        let mut first = true;
        while tokio::signal::ctrl_c().await.is_ok() {
            interrupts.interrupt();
            if first {
                first = false;
                interrupts.disconnect().await;
            }
        }
        warn!("Ctrl-C handler stopped");
    });

    client.req_current_time().await;
    client.req_managed_accts().await;
    client.run().await;

    Ok(())
}
