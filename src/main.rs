use anyhow::Context;
use clap::Parser;
use kitsune::cache::build_cache_store;
use kitsune::config::Config;
use kitsune::gateway::KitsuneGateway;
use kitsune::image_optimizer::RasterProcessor;
use kitsune::metrics::Metrics;
use kitsune::origin::{ObjectStoreOrigin, RemoteHttpOrigin};
use kitsune::pipeline::TransformationOrchestrator;
use kitsune::security::SignatureVerifier;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use std::path::PathBuf;
use std::sync::Arc;

/// Kitsune - On-demand image transformation gateway built with Cloudflare's Pingora
#[derive(Parser, Debug)]
#[command(name = "kitsune")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    config.validate().context("Invalid configuration")?;

    if args.test {
        println!("Configuration {} is valid", args.config.display());
        return Ok(());
    }

    kitsune::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        bucket = %config.object_store.bucket,
        cache_backend = ?config.cache.backend,
        hmac_enabled = config.security.hmac_enabled,
        "Configuration loaded successfully"
    );

    let gateway = build_gateway(&config)?;

    let opt = Opt {
        daemon: args.daemon,
        ..Default::default()
    };

    let mut server = Server::new(Some(opt))
        .map_err(|e| anyhow::anyhow!("Failed to create Pingora server: {}", e))?;
    server.bootstrap();

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, gateway);
    proxy_service.threads = Some(config.server.threads);

    let listen_addr = config.server.listen_addr();
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(address = %listen_addr, "Starting Kitsune image gateway");

    server.add_service(proxy_service);
    server.run_forever();
}

/// Construct the shared components before Pingora starts its runtimes
///
/// The object store client needs an async config load, which runs on a
/// throwaway runtime. Connections are made lazily on the serving runtime.
fn build_gateway(config: &Config) -> anyhow::Result<KitsuneGateway> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build bootstrap runtime")?;
    let object_store = runtime.block_on(ObjectStoreOrigin::from_config(&config.object_store));

    let cache = build_cache_store(&config.cache).context("Failed to initialize cache store")?;
    let remote = RemoteHttpOrigin::from_config(&config.remote_fetch)
        .context("Invalid remote_fetch.blocked_ranges")?;
    let processor = RasterProcessor::from_config(&config.image);
    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);

    let orchestrator = TransformationOrchestrator::new(
        cache,
        Arc::new(object_store),
        Arc::new(remote),
        Arc::new(processor),
        metrics.clone(),
    );

    let verifier = if config.security.hmac_enabled {
        config
            .security
            .hmac_secret
            .as_deref()
            .map(|secret| SignatureVerifier::new(secret.as_bytes()))
    } else {
        None
    };

    Ok(KitsuneGateway::new(
        orchestrator,
        verifier,
        metrics,
        config.server.request_timeout(),
    )
    .with_output_limits(config.image.output_limits()))
}
