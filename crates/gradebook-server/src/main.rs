//! gradebook-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) merged with
//! `GRADEBOOK_*` environment variables, opens an in-process SQLite store, and
//! either serves the JSON API over HTTP or runs a one-off maintenance command.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash` in config.toml:
//!
//! ```text
//! cargo run -p gradebook-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use gradebook_core::history::SYSTEM_ACTOR;
use gradebook_engine::GradebookEngine;
use gradebook_server::{AppState, ServerConfig, auth::AuthConfig};
use gradebook_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Gradebook computation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Recompute every enrolled student's term result for a class.
  Recompute {
    #[arg(long)]
    class:      Uuid,
    #[arg(long)]
    term:       Uuid,
    /// Overrides `engine.batch_size` from the configuration.
    #[arg(long)]
    batch_size: Option<usize>,
  },
  /// List configuration problems that would block or zero a class's grading.
  Validate {
    #[arg(long)]
    class: Uuid,
  },
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("GRADEBOOK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let engine = GradebookEngine::new(Arc::new(store), server_cfg.engine.clone());

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(engine, server_cfg).await,
    Command::Recompute { class, term, batch_size } => {
      let gradebook = engine
        .gradebook_for_class(class)
        .await
        .with_context(|| format!("cannot recompute class {class}"))?;
      let report = engine
        .batch_recompute(gradebook.gradebook_id, term, batch_size, SYSTEM_ACTOR)
        .await
        .with_context(|| format!("recompute of class {class} failed"))?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      if !report.failed.is_empty() {
        anyhow::bail!("{} student(s) could not be recomputed", report.failed.len());
      }
      Ok(())
    }
    Command::Validate { class } => {
      let issues = engine
        .validate_class(class)
        .await
        .with_context(|| format!("cannot validate class {class}"))?;
      if issues.is_empty() {
        println!("class {class} is fully configured");
        return Ok(());
      }
      for issue in &issues {
        println!("- {issue}");
      }
      anyhow::bail!("class {class} has {} configuration issue(s)", issues.len())
    }
  }
}

async fn serve(
  engine: GradebookEngine<SqliteStore>,
  server_cfg: ServerConfig,
) -> anyhow::Result<()> {
  let state = AppState {
    engine,
    auth: Arc::new(AuthConfig {
      username:      server_cfg.auth_username.clone(),
      password_hash: server_cfg.auth_password_hash.clone(),
    }),
  };

  let app = gradebook_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
