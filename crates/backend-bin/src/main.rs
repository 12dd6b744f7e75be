use anyhow::{bail, Context};
use backend_lib::{
    auth::{DefaultCredentialService, SessionManager},
    config::{Settings, StorageBackend},
    router,
    storage::FlatFileAccountStore,
    validation::{Identifier, Secret},
    AppState,
};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::{interval, Duration};
use tracing_subscriber::EnvFilter;

/// How often expired sessions and stale lockouts are dropped
const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Parser, Debug)]
#[command(name = "quickcare-backend", version, about = "QuickCare credential service")]
struct Cli {
    /// TOML config file, defaults to config/default.toml
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create a doctor account in the flat-file store
    ProvisionDoctor {
        #[arg(long)]
        identifier: String,
        #[arg(long, env = "QUICKCARE_PROVISION_SECRET", hide_env_values = true)]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&settings);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::ProvisionDoctor { identifier, secret } => {
            provision_doctor(&settings, &identifier, secret).await
        },
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(&settings)?);

    // Periodic cleanup of expired sessions and lockout records
    let sessions = state.sessions.clone();
    let auth_rate_limiter = state.auth_rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            auth_rate_limiter.cleanup();
            tracing::debug!(purged, "scheduled session cleanup");
        }
    });

    let app = router::create_router(state);

    let addr = settings.bind_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, backend = ?settings.storage.backend, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn provision_doctor(
    settings: &Settings,
    identifier: &str,
    secret: String,
) -> anyhow::Result<()> {
    if settings.storage.backend != StorageBackend::FlatFile {
        bail!(
            "provisioning needs the flat_file storage backend, the memory store would drop the account"
        );
    }

    let identifier = Identifier::parse(identifier)?;
    let secret = Secret::parse(secret)?;

    let store = FlatFileAccountStore::new(&settings.storage.path)?;
    let service = DefaultCredentialService::new(
        store,
        SessionManager::with_ttl_secs(settings.session.ttl_secs),
        settings.hashing.clone(),
    );

    let id = service.provision_doctor(identifier, secret).await?;
    tracing::info!(account_id = %id, "provisioned");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
