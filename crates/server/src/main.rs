use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscout_core::{
    create_catalog, create_llm_client, load_config, validate_config, Credentials,
    DirectoryMonitor, DirectoryPipeline, DirectoryProcessor, DownloadManager,
    OpenSubtitlesClient, SubtitleResolver, TitleResolver, TranslationFallback,
};
use subscout_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SUBSCOUT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Metadata backend: {}", config.metadata.backend.as_str());
    info!(
        "Preferred subtitle languages: {:?}",
        config.pipeline.preferred_languages
    );

    // External services
    let catalog =
        create_catalog(&config.metadata).context("Failed to create metadata client")?;
    info!("Using metadata backend: {}", catalog.name());

    let llm = create_llm_client(&config.llm).context("Failed to create LLM client")?;
    info!("Using LLM provider: {:?}", config.llm.provider);

    let opensubtitles = Arc::new(
        OpenSubtitlesClient::new(&config.opensubtitles)
            .context("Failed to create OpenSubtitles client")?,
    );

    // Pipeline components
    let languages = config.pipeline.preferred_languages.clone();
    let subtitles = Arc::new(SubtitleResolver::new(
        opensubtitles.clone(),
        languages.clone(),
    ));
    let credentials = Credentials::new(
        config.opensubtitles.username.clone(),
        config.opensubtitles.password.clone(),
    );
    let downloads = Arc::new(
        DownloadManager::new(opensubtitles, credentials)
            .context("Failed to create download manager")?,
    );

    let pipeline = DirectoryPipeline::new(
        TitleResolver::new(catalog.clone(), llm.clone()),
        subtitles.clone(),
        downloads.clone(),
        TranslationFallback::new(
            llm.clone(),
            languages.clone(),
            config.pipeline.translation_target.clone(),
        ),
    );
    let locks = pipeline.locks().clone();
    let processor: Arc<dyn DirectoryProcessor> = Arc::new(pipeline);

    // Directory monitor
    let monitor = if config.watcher.enabled {
        let monitor = Arc::new(
            DirectoryMonitor::new(config.watcher.clone(), processor.clone())
                .context("Failed to create directory monitor")?,
        );
        monitor
            .start()
            .await
            .context("Failed to start directory monitor")?;
        info!("Watching {:?}", monitor.root());
        Some(monitor)
    } else {
        warn!("Directory monitor disabled in config");
        None
    };

    // Create app state
    let state = Arc::new(
        AppState::new(
            config.clone(),
            catalog,
            subtitles,
            downloads,
            TranslationFallback::new(llm, languages, config.pipeline.translation_target.clone()),
            processor,
            monitor.clone(),
        )
        .with_locks(locks),
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Stop monitor; pending deferred runs are cancelled
    if let Some(monitor) = monitor {
        info!("Stopping directory monitor...");
        monitor.stop().await;
        info!("Directory monitor stopped");
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
