use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use payhand::app;
use payhand::config::Config;
use payhand::crypto::MasterKey;
use payhand::db;

#[derive(Parser)]
#[command(name = "payhand", version, about = "Checkout-intent orchestration service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database schema and exit
    InitDb,
    /// Print a fresh base64 master key for PAYHAND_MASTER_KEY
    GenMasterKey,
}

fn master_key(config: &Config) -> anyhow::Result<MasterKey> {
    match &config.master_key {
        Some(encoded) => MasterKey::from_base64(encoded).context("invalid PAYHAND_MASTER_KEY"),
        None if config.dev_mode => {
            tracing::warn!(
                "DEV: PAYHAND_MASTER_KEY not set, using an ephemeral key; saved secret keys will not survive a restart"
            );
            Ok(MasterKey::from_base64(&MasterKey::generate_base64())?)
        }
        None => bail!("PAYHAND_MASTER_KEY must be set (generate one with `payhand gen-master-key`)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payhand=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve);
    if let Command::GenMasterKey = command {
        println!("{}", MasterKey::generate_base64());
        return Ok(());
    }

    let config = Config::from_env();

    let pool = db::create_pool(&config.database_path)
        .with_context(|| format!("failed to open database {}", config.database_path))?;
    {
        let conn = pool.get()?;
        db::init_db(&conn)?;
    }

    match command {
        Command::GenMasterKey => Ok(()),
        Command::InitDb => {
            tracing::info!("Database initialized at {}", config.database_path);
            Ok(())
        }
        Command::Serve => serve(config, pool).await,
    }
}

async fn serve(config: Config, pool: db::DbPool) -> anyhow::Result<()> {
    let master_key = master_key(&config)?;
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY not set; /admin routes are disabled");
    }

    let state = app::build_state(&config, pool, master_key)?;
    let router = app::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    tracing::info!(
        "payhand listening on {} (provider {}, timeout {}s)",
        config.addr(),
        config.provider_api_base,
        config.provider_timeout.as_secs()
    );

    axum::serve(listener, router).await?;
    Ok(())
}
