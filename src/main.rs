//! Employee Manager command-line entry point.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use employee_manager::client::HttpEmployeeClient;
use employee_manager::config::Config;
use employee_manager::db::{self, Repository};
use employee_manager::{console, create_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "employee-manager", version, about = "Manage employee records")]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Open the interactive employee page (default)
    Console {
        /// Base URL of the employee collection
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
    /// Serve the employee collection over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Log to stderr so diagnostics never interleave with the page on stdout
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    match cli.command.unwrap_or(Mode::Console { url: None }) {
        Mode::Console { url } => {
            let api_url = url.unwrap_or_else(|| config.api_url.clone());
            let api = HttpEmployeeClient::new(api_url, config.http_timeout)?;
            tracing::info!("Using employee collection at {}", api.base_url());

            console::run(Arc::new(api), io::BufReader::new(io::stdin())).await?;
        }
        Mode::Serve { bind } => {
            let bind_addr = bind.unwrap_or(config.bind_addr);
            serve(&config, bind_addr).await?;
        }
    }

    Ok(())
}

async fn serve(config: &Config, bind_addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting employee service");
    tracing::info!("Database path: {:?}", config.db_path);

    let pool = db::init_database(&config.db_path).await?;
    let state = AppState {
        repo: Arc::new(Repository::new(pool)),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
