use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use violation_exporter::config::ExporterConfig;
use violation_exporter::kubernetes::{events, K8sClient};
use violation_exporter::metrics::ViolationRegistry;
use violation_exporter::server;
use violation_exporter::violations::ViolationPipeline;
use violation_exporter::{AppState, WatchStatus};

/// Export policy controller violation events as Prometheus metrics
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to kubeconfig file
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Namespace to listen to events in
    #[arg(long)]
    event_namespace: Option<String>,

    /// Address to bind the metrics server to
    #[arg(long)]
    host: Option<String>,

    /// Port to serve metrics on
    #[arg(long)]
    port: Option<u16>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

impl Cli {
    fn apply(self, config: &mut ExporterConfig) {
        if let Some(path) = self.kubeconfig.filter(|p| !p.as_os_str().is_empty()) {
            config.kubernetes.kubeconfig = Some(path);
        }
        if let Some(namespace) = self.event_namespace {
            config.kubernetes.namespace = namespace;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", ExporterConfig::generate_sample());
        return Ok(());
    }

    let mut config = ExporterConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    // Hold the guard so buffered file logs are flushed on exit
    let _log_guard = config
        .logging
        .init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    let client = K8sClient::connect(config.kubernetes.kubeconfig.as_deref())
        .await
        .context("could not create kubernetes client")?;
    info!(api_server = client.api_server(), "Connected to cluster");

    let frames = events::watch_events(&client, &config.kubernetes.namespace)
        .await
        .context("could not watch events")?;
    info!(
        namespace = %config.kubernetes.namespace,
        timeout_secs = events::WATCH_TIMEOUT_SECS,
        "Watching events"
    );

    let registry = Arc::new(ViolationRegistry::new()?);
    let watch_status = Arc::new(WatchStatus::new());

    let pipeline = ViolationPipeline::new(registry.clone());
    let pipeline_status = watch_status.clone();
    let pipeline_task = tokio::spawn(async move {
        pipeline
            .run(events::admission_events(frames), &pipeline_status)
            .await;
    });

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("could not bind {}", config.listen_addr()))?;

    let result = server::serve(listener, AppState::new(registry, watch_status)).await;

    pipeline_task.abort();
    info!("Shutdown complete");

    result.context("metrics server failed")
}
