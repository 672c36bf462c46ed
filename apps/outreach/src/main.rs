use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outreach::api_client::RequestClient;
use outreach::config::{Config, RequestConfig};
use outreach::storage::{open_store, PersonalInfoStore};
use outreach::stub::{self, StubState};
use outreach::terminal::{Terminal, DEFAULT_EXPORT_FILE};
use outreach::wizard::Wizard;

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Turn a job posting into a personalized cold email", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the four-step wizard in the terminal
    Wizard {
        /// Backend base URL (overrides OUTREACH_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Where the finished email is saved
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,

        /// Run against an in-process stub backend instead of a real one
        #[arg(long)]
        offline: bool,
    },
    /// Serve the stub backend over HTTP
    Stub {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Artificial delay per extract/generate response
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with wizard prompts.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting outreach v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Stub { port, latency_ms } => {
            let addr: SocketAddr = format!("0.0.0.0:{}", port.unwrap_or(config.port)).parse()?;
            let listener = TcpListener::bind(addr).await?;
            stub::serve(listener, StubState::new(Duration::from_millis(latency_ms))).await
        }
        Commands::Wizard {
            api_url,
            output,
            offline,
        } => {
            let request = if offline {
                let base_url = start_offline_stub().await?;
                with_base_url(&config.request, &base_url)?
            } else if let Some(url) = api_url {
                with_base_url(&config.request, &url)?
            } else {
                config.request.clone()
            };
            let client = RequestClient::new(request)?;
            info!(
                "Using backend at {} (timeout {}ms, {} retries)",
                client.config().base_url,
                client.config().timeout.as_millis(),
                client.config().max_retries
            );
            let store = PersonalInfoStore::new(open_store(config.storage_path.clone()));
            let mut wizard = Wizard::new(client, store);

            let input = BufReader::new(tokio::io::stdin());
            let mut terminal = Terminal::new(input, tokio::io::stdout()).with_export_path(output);
            terminal.run(&mut wizard).await
        }
    }
}

/// Serves the stub on an ephemeral loopback port and returns its base URL.
async fn start_offline_stub() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = stub::serve(listener, StubState::default()).await {
            error!("In-process stub backend stopped: {e:#}");
        }
    });
    Ok(base_url)
}

fn with_base_url(request: &RequestConfig, base_url: &str) -> Result<RequestConfig> {
    RequestConfig::new(base_url, request.timeout, request.max_retries)
}
