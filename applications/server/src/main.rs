/// Chorus Server - collaborative and smart playlists
use chorus_core::UserId;
use chorus_server::{
    config::ServerConfig, create_router, jobs::SmartPlaylistRefresher, services::AuthService,
    state::AppState,
};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chorus-server")]
#[command(about = "Chorus collaborative playlist server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CHORUS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Refresh every auto-updating smart playlist once and exit
    RefreshSmartPlaylists,
    /// Print an access token for a user id
    Token {
        /// User ID
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorus_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::load_from(cli.config)?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::RefreshSmartPlaylists => refresh_smart_playlists(config).await?,
        Commands::Token { user_id } => print_token(&config, user_id)?,
    }

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<SqlitePool> {
    let pool = chorus_storage::create_pool(&config.storage.database_url).await?;
    chorus_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");
    Ok(pool)
}

fn auth_service(config: &ServerConfig) -> Arc<AuthService> {
    Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    ))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Chorus Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool = open_database(&config).await?;
    let app_state = AppState::new(pool, auth_service(&config));

    let mut refresher = SmartPlaylistRefresher::new(
        app_state.smart_playlists.clone(),
        config.smart_playlists.refresh_interval(),
    );
    if config.smart_playlists.refresh_enabled {
        refresher.start();
    } else {
        tracing::info!("Smart playlist refresh disabled");
    }

    let app = create_router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.stop().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn refresh_smart_playlists(config: ServerConfig) -> anyhow::Result<()> {
    let pool = open_database(&config).await?;
    let app_state = AppState::new(pool, auth_service(&config));

    let summary = app_state.smart_playlists.refresh_all().await?;
    println!(
        "Checked {} smart playlists: {} updated, {} unchanged, {} failed",
        summary.checked, summary.updated, summary.unchanged, summary.failed
    );

    Ok(())
}

fn print_token(config: &ServerConfig, user_id: String) -> anyhow::Result<()> {
    let token = auth_service(config).create_access_token(&UserId::new(user_id))?;
    println!("{token}");
    Ok(())
}
