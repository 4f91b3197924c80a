//! ALS collector - main entry point.
//!
//! Starts one gRPC listener serving both access-log service generations:
//! - envoy.service.accesslog.v2.AccessLogService
//! - envoy.service.accesslog.v3.AccessLogService

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use als_collector::grpc::CollectorServer;
use als_collector::stream::StdoutSink;
use als_collector::{observability, Config};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Envoy access-log service collector.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Listening port for the ALS service.
    #[arg(long)]
    port: Option<u16>,

    /// Optional JSON config file.
    #[arg(long, env = "ALS_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Resolve the effective configuration: file, then flags.
    fn load_config(&self) -> als_collector::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        match self.log_format {
            Some(LogFormat::Json) => config.observability.json_logs = true,
            Some(LogFormat::Text) => config.observability.json_logs = false,
            None if observability::json_format_from_env() => config.observability.json_logs = true,
            None => {}
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            observability::init_tracing(&Default::default());
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    observability::init_tracing(&config.observability);

    let server = CollectorServer::new(config.server.clone(), Arc::new(StdoutSink));

    let listener = match server.bind().await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            signal_server.shutdown();
        }
    });

    if let Err(e) = server.serve_with_listener(listener).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
