//! santa-server binary.
//!
//! Reads `santa.toml` (or the path given with `--config`), opens the SQLite
//! store once for the life of the process, and either serves the JSON API or
//! runs one administrative command against the registry.
//!
//! ```
//! santa-server seed data/names.json
//! santa-server serve
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use santa_core::{service::SecretSanta, store::SantaStore};
use santa_server::{ServerConfig, expand_tilde, seed};
use santa_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Secret Santa allocation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "santa.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Load eligible people from a `{"unassigned": [...]}` JSON file.
  Seed { file: PathBuf },
  /// Remove a person from the registry by email.
  Remove { email: String },
  /// List the registry and who has already been drawn.
  People,
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

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&server_cfg, Arc::clone(&store)).await?,
    Command::Seed { file } => {
      let people =
        seed::read(&file).with_context(|| format!("failed to load {}", file.display()))?;
      let inserted = store.seed_people(people).await.context("migration failed")?;
      info!(inserted, "registry seeded");
    }
    Command::Remove { email } => {
      let person = store
        .find_person_by_email(&email)
        .await
        .context("registry lookup failed")?;
      let Some(person) = person else {
        bail!("no one in the registry has email {email}");
      };
      store.remove_person(person.person_id).await.context("removal failed")?;
      info!(name = %person.name, "removed from registry");
    }
    Command::People => {
      let taken = store.assigned_names().await.context("ledger lookup failed")?;
      for person in store.list_people().await.context("registry lookup failed")? {
        let status = if taken.contains(&person.name) { "drawn" } else { "available" };
        println!("{:<24} {:<32} {status}", person.name, person.email);
      }
    }
  }

  match Arc::try_unwrap(store) {
    Ok(store) => store.close().await.context("failed to close store")?,
    Err(_) => warn!("store still shared at shutdown; leaving it to drop"),
  }
  Ok(())
}

async fn serve(cfg: &ServerConfig, store: Arc<SqliteStore>) -> anyhow::Result<()> {
  let santa = Arc::new(SecretSanta::new(store));
  let app = santa_server::router(santa);
  let address = cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("shutting down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c; running until killed");
    std::future::pending::<()>().await;
  }
}
