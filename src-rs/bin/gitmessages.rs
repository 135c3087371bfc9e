use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gitmessages::api::MessageServer;
use gitmessages::rotation::{default_pool, read_pool_file, RotationStore};
use gitmessages::ServerConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gitmessages")]
#[command(about = "Random git commit messages, without repeats until every one has been served")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Show version information
    #[arg(long)]
    version: bool,

    /// Probe a running server's health endpoint and exit with its status
    #[arg(long)]
    status: bool,

    /// Port to listen on (random 64000-64999 when unset)
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Data directory holding the database
    #[arg(long = "data", env = "GITMESSAGES_DATA", default_value = "./data")]
    data_dir: PathBuf,

    /// Listen address
    #[arg(long, env = "GITMESSAGES_ADDRESS", default_value = "0.0.0.0")]
    address: String,

    /// JSON array of messages to load on first start (bundled list when unset)
    #[arg(long = "messages", env = "GITMESSAGES_MESSAGES")]
    messages_file: Option<PathBuf>,

    /// Bearer token required by POST /api/v1/reset
    #[arg(long, env = "GITMESSAGES_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Development mode (debug logging)
    #[arg(long)]
    dev: bool,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            address: self.address,
            port: self.port,
            data_dir: self.data_dir,
            messages_file: self.messages_file,
            admin_token: self.admin_token.filter(|token| !token.trim().is_empty()),
            dev: self.dev,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("gitmessages version {}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }

    let status = cli.status;
    let config = cli.into_config();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if config.dev { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if status {
        return check_status(&config).await;
    }

    run_server(config).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let db_path = config.db_path();
    info!("initializing database at {}", db_path.display());

    let pool = match &config.messages_file {
        Some(path) => read_pool_file(path)?,
        None => default_pool()?,
    };

    let store = tokio::task::spawn_blocking(move || -> Result<RotationStore> {
        let store = RotationStore::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        store.load(&pool).context("failed to load messages")?;
        Ok(store)
    })
    .await??;

    let port = config.resolve_port();
    if config.port.is_none() {
        info!(port, "no port specified, using random port");
    }
    let addr = config.listen_addr(port).map_err(anyhow::Error::msg)?;

    info!("starting gitmessages v{}", VERSION);
    info!("  GET  /api/v1/random       random message (JSON)");
    info!("  GET  /api/v1/random.txt   random message (text)");
    info!("  GET  /api/v1/stats        usage statistics");
    info!("  POST /api/v1/reset        start a new cycle");
    info!("  GET  /healthz             health check");

    let server = MessageServer::new(addr, Arc::new(store), config.admin_token);
    server.start().await.map_err(anyhow::Error::msg)
}

async fn check_status(config: &ServerConfig) -> Result<ExitCode> {
    let Some(port) = config.port else {
        println!("Server: unknown (pass --port or PORT to probe)");
        return Ok(ExitCode::FAILURE);
    };
    let host = if config.address == "0.0.0.0" {
        "127.0.0.1"
    } else {
        config.address.as_str()
    };
    let url = format!("http://{}:{}/healthz", host, port);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            println!("Server: running at {}", url);
            let messages = &body["checks"]["messages"];
            if messages.is_object() {
                println!(
                    "Cycle: {}  Used: {}  Remaining: {}",
                    messages["cycle"], messages["used_in_cycle"], messages["remaining_in_cycle"]
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(resp) => {
            println!("Server: unhealthy (http {})", resp.status().as_u16());
            Ok(ExitCode::FAILURE)
        }
        Err(_) => {
            println!("Server: not running");
            Ok(ExitCode::FAILURE)
        }
    }
}
