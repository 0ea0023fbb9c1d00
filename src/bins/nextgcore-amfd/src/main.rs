//! NextGCore AMF (Access and Mobility Management Function)
//!
//! Daemon entry point: loads the configuration, starts the worker runtime and
//! serves gNBs until interrupted.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;

use nextgcore_amfd::config::{AmfConfig, ConfigError};
use nextgcore_amfd::runtime::{serve_tcp, Runtime};
use nextgcore_amfd::AmfIndication;

/// NextGCore AMF - Access and Mobility Management Function
#[derive(Parser, Debug)]
#[command(name = "nextgcore-amfd")]
#[command(author = "NextGCore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "5G Core Access and Mobility Management Function")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/nextgcore/amf.yaml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// NGAP bind address; overrides the configuration
    #[arg(long)]
    ngap_addr: Option<String>,

    /// Number of worker tasks; overrides the configuration
    #[arg(short, long)]
    workers: Option<usize>,
}

fn load_config(path: &str) -> Result<AmfConfig> {
    match AmfConfig::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io { path, source }) => {
            log::warn!("Could not read config file '{}': {}. Using defaults.", path, source);
            Ok(AmfConfig::default())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to load config: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    log::info!("NextGCore AMF v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Configuration: {}", args.config);

    let config = load_config(&args.config)?;
    let profile = config.resolve()?;
    log::info!(
        "AMF '{}': {} GUAMI, {} PLMN support",
        profile.amf_name.as_str(),
        profile.guamis.len(),
        profile.plmn_support.0.len()
    );

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let workers = args.workers.unwrap_or(config.workers);
    let (runtime, outputs) = Runtime::start(profile, workers);
    let runtime = Arc::new(runtime);

    // No NAS layer in this daemon; indications are only traced
    let mut upper = outputs.upper;
    tokio::spawn(async move {
        while let Some(indication) = upper.recv().await {
            match indication {
                AmfIndication::Nas {
                    amf_ue_ngap_id,
                    nas_pdu,
                } => log::debug!(
                    "NAS PDU from amf_ue_ngap_id={} ({} octets)",
                    amf_ue_ngap_id,
                    nas_pdu.0.len()
                ),
                other => log::debug!("Indication: {}", other.name()),
            }
        }
    });

    let ngap_addr = args.ngap_addr.unwrap_or_else(|| config.ngap.addr.clone());
    let ngap_addr: SocketAddr = ngap_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid NGAP address '{}': {}", ngap_addr, e))?;
    let listener = TcpListener::bind(ngap_addr).await?;
    log::info!("NGAP listening on {}", ngap_addr);

    let server = tokio::spawn(serve_tcp(runtime.clone(), listener, outputs.outbound));

    log::info!("AMF running...");
    while running.load(Ordering::SeqCst) {
        if server.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if server.is_finished() {
        if let Ok(Err(e)) = server.await {
            log::error!("NGAP server failed: {}", e);
        }
    } else {
        server.abort();
    }

    if let Ok(runtime) = Arc::try_unwrap(runtime) {
        runtime.shutdown();
    }
    log::info!("NextGCore AMF terminated");
    Ok(())
}
