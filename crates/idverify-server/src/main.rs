//! IDVerify server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! configured record store, and serves the admin API and the public
//! verification pages over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash`:
//!
//! ```text
//! cargo run -p idverify-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use idverify_advisor::GeminiAdvisor;
use idverify_api::{AppState, Backend, auth::hash_password};
use idverify_server::{ServerConfig, StoreConfig, seed_credentials};
use idverify_store_remote::RemoteStore;
use idverify_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "IDVerify ID card server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("IDVERIFY").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  match &server_cfg.store {
    StoreConfig::Sqlite { path } => {
      let path = expand_tilde(path);
      if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
      {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!(?path, "using SQLite store");
      serve(store, server_cfg).await
    }
    StoreConfig::Remote { endpoint, .. } => {
      tracing::info!(%endpoint, "using remote document store");
      let remote = server_cfg.store.remote().context("remote store settings")?;
      let store = RemoteStore::new(remote).context("failed to build remote store client")?;
      serve(store, server_cfg).await
    }
  }
}

async fn serve<S: Backend>(store: S, server_cfg: ServerConfig) -> anyhow::Result<()> {
  seed_credentials(&store, &server_cfg)
    .await
    .context("failed to seed admin credentials")?;

  let timeout = server_cfg.advisory_timeout();
  let advisor = match &server_cfg.advisor {
    Some(advisor_cfg) => {
      let advisor = GeminiAdvisor::new(advisor_cfg.gemini(timeout))
        .context("failed to build advisory client")?;
      tracing::info!(?timeout, "advisory verification enabled");
      Some(Arc::new(advisor))
    }
    None => {
      tracing::info!("no advisor configured; verifying by date only");
      None
    }
  };

  let state = AppState::new(Arc::new(store), advisor, timeout, server_cfg.api_config());
  let app = idverify_server::app(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_owned();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
