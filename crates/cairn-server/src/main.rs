//! cairn-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite student store when `store_path` is configured, otherwise falls
//! back to the in-memory demo store, and serves the JSON API over HTTP.
//!
//! Every config key can also come from the environment with a `CAIRN_`
//! prefix, e.g. `CAIRN_HF_API_KEY` for the summarizer key.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cairn_api::AppState;
use cairn_core::{seed::demo_students, store::StudentStore};
use cairn_store_memory::MemoryStore;
use cairn_store_sqlite::SqliteStore;
use cairn_summary::{HfSummarizer, SummaryCache};

#[derive(Parser)]
#[command(author, version, about = "Cairn student advising server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,

  #[serde(default = "default_port")]
  port: u16,

  /// SQLite file for the durable store. Absent means the in-memory
  /// fallback, which starts from the demo dataset and forgets everything
  /// on shutdown.
  store_path: Option<PathBuf>,

  /// Hugging Face API key. Without it the summary endpoint answers 503.
  hf_api_key: Option<String>,

  /// Override the default summarization model.
  hf_model: Option<String>,

  /// Leave an empty durable store empty instead of seeding the demo
  /// dataset.
  #[serde(default)]
  no_seed: bool,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  4700
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CAIRN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if let Some(path) = server_cfg.store_path.clone() {
    let store = SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?;

    if !server_cfg.no_seed && store.count_students().await? == 0 {
      tracing::info!("seeding demo dataset into empty store");
      for student in demo_students() {
        store.insert_student(&student).await?;
      }
    }

    serve(server_cfg, Arc::new(store)).await
  } else {
    tracing::warn!(
      "no store_path configured; using the in-memory demo store"
    );
    serve(server_cfg, Arc::new(MemoryStore::new(demo_students()))).await
  }
}

async fn serve<S>(cfg: ServerConfig, store: Arc<S>) -> anyhow::Result<()>
where
  S: StudentStore + 'static,
{
  let state = AppState {
    store,
    summarizer: Arc::new(HfSummarizer::new(
      cfg.hf_api_key.clone(),
      cfg.hf_model.clone(),
    )),
    cache: Arc::new(SummaryCache::new()),
  };

  let app = axum::Router::new()
    .nest("/api", cairn_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
