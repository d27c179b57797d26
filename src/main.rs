use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dgas::Config;
use dgas_shared::identity::Role;
use sqlx::migrate::MigrateDatabase;

/// dgas - gas cylinder booking and delivery
#[derive(Parser)]
#[command(name = "dgas")]
#[command(about = "Gas cylinder booking, subscription and delivery service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Change the role of an existing account
    SetRole {
        #[arg(long)]
        email: String,

        #[arg(long, value_enum)]
        role: RoleArg,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Customer,
    DeliveryPartner,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Customer => Role::Customer,
            RoleArg::DeliveryPartner => Role::DeliveryPartner,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    dgas::observability::init_observability(
        "dgas",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::SetRole { email, role } => set_role_command(config, email, role.into()).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting dgas server...");

    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    // Writes go through one connection, reads fan out.
    let write_pool = dgas::create_write_pool(&config.database.url).await?;
    dgas::run_migrations(&write_pool).await?;

    let read_pool =
        dgas::create_read_pool(&config.database.url, config.database.max_connections).await?;

    let state = dgas_shared::State {
        read_db: read_pool.clone(),
        write_db: write_pool.clone(),
        changes: dgas_shared::ChangeFeed::default(),
    };

    let app_state = dgas::AppState::new(config, state);

    if app_state
        .identity
        .seed_root(&app_state.config.root.email, &app_state.config.root.password)
        .await?
    {
        tracing::info!(email = %app_state.config.root.email, "root admin created");
    }

    let app = dgas::create_app(app_state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pools...");
    read_pool.close().await;
    write_pool.close().await;

    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = dgas::create_pool(&config.database.url, 1).await?;
    dgas::run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn set_role_command(config: Config, email: String, role: Role) -> Result<()> {
    let pool = dgas::create_pool(&config.database.url, 1).await?;
    let identity = dgas_identity::Command::new(
        dgas_shared::State::single(pool.clone()),
        config.identity_policy(),
    );

    let result = identity.set_role(&email, role).await;
    pool.close().await;

    match result {
        Ok(account_id) => {
            tracing::info!(%email, %account_id, %role, "role updated");

            Ok(())
        }
        Err(dgas_shared::Error::AccountNotFound) => {
            Err(anyhow::anyhow!("account {email} not found"))
        }
        Err(e) => Err(e.into()),
    }
}
