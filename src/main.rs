// src/main.rs
//! LINCOT - Linux GPS to TAK gateway

use clap::Parser;
use lincot::{
    config::LincotConfig,
    error::{LincotError, Result},
    transport::{CotUrl, TxWorker},
    worker::LincotWorker,
};
use std::path::PathBuf;
use tokio::task::JoinError;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "lincot", version, about = "Send GPS position fixes to TAK as Cursor on Target")]
struct Cli {
    /// JSON config file (default: ~/.config/lincot/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Destination, e.g. tcp://takserver:8087, udp://239.2.3.1:6969, log://stdout
    #[arg(short = 'U', long)]
    cot_url: Option<String>,

    /// Callsign shown on the map
    #[arg(long)]
    callsign: Option<String>,

    /// CoT event type
    #[arg(long)]
    cot_type: Option<String>,

    /// Seconds until the marker goes stale
    #[arg(long)]
    cot_stale: Option<u64>,

    /// Free text placed in the marker remarks
    #[arg(long = "host-id")]
    cot_host_id: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    poll_interval: Option<u64>,

    /// Command printing gpsd JSON reports
    #[arg(short, long)]
    gps_info_cmd: Option<String>,

    /// Stop after this many polls
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    /// File, then environment, then command line
    fn load_config(&self) -> Result<LincotConfig> {
        let mut config = LincotConfig::load(self.config.as_deref())?;
        config.apply_env()?;
        config.apply_overrides(&self.overrides());
        Ok(config)
    }

    fn overrides(&self) -> LincotConfig {
        LincotConfig {
            cot_url: self.cot_url.clone(),
            cot_type: self.cot_type.clone(),
            cot_stale: self.cot_stale,
            callsign: self.callsign.clone(),
            cot_host_id: self.cot_host_id.clone(),
            poll_interval: self.poll_interval,
            gps_info_cmd: self.gps_info_cmd.clone(),
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so log://stdout carries only CoT
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn tx_result(result: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    result.map_err(|e| LincotError::Other(format!("Transmit worker failed: {}", e)))?
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = cli.load_config()?;
    let url: CotUrl = config.cot_url().parse()?;

    info!("Starting LINCOT {}", env!("CARGO_PKG_VERSION"));
    info!("Sending to: {}", url);

    let (tx_worker, tx) = TxWorker::new(url);
    let mut tx_handle = tokio::spawn(tx_worker.run());
    let mut worker = LincotWorker::new(config, tx);

    let poll_result = tokio::select! {
        result = worker.run(cli.iterations) => result,
        result = &mut tx_handle => return tx_result(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            return Ok(());
        }
    };

    // Closing the queue lets the transmitter flush and finish
    drop(worker);
    tx_result(tx_handle.await).and(poll_result)
}
