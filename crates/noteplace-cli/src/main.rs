//! CLI for `noteplace` — drop notes into a remote vault.
//!
//! ```bash
//! np --url https://127.0.0.1:27124 --api-key KEY check
//! echo "# Standup" | np place "Standup" --dir Meetings --vault Work
//! np place "Journal" --file entry.md --behavior append-daily
//! np plan "Standup" --dir Meetings --behavior prepend-specific
//! np gen-config > noteplace.json
//! ```

use std::{io::Read, path::PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use noteplace_core::{LoggingConfig, PlacementRequest, RemoteConfig, SaveBehavior, Settings};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// `noteplace` — place markdown notes into a remote vault over its REST API.
#[derive(Parser)]
#[command(name = "np", version, about)]
struct Cli {
  /// Verbose output (repeatable: -v, -vv).
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// JSON settings file.
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Service base URL (overrides the settings file).
  #[arg(long, env = "NOTEPLACE_URL", global = true)]
  url: Option<String>,

  /// Bearer API key (overrides the settings file).
  #[arg(long, env = "NOTEPLACE_API_KEY", global = true, hide_env_values = true)]
  api_key: Option<String>,

  /// Command.
  #[command(subcommand)]
  command: Commands
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
  /// Test the connection to the service.
  Check,

  /// Place a note.
  Place(NoteArgs),

  /// Resolve a placement and print the plan without writing anything.
  Plan(NoteArgs),

  /// Print an example settings file.
  GenConfig
}

/// Note to place.
#[derive(Args)]
struct NoteArgs {
  /// Note name, without extension.
  name: String,
  /// Read the body from this file instead of stdin.
  #[arg(short, long)]
  file: Option<PathBuf>,
  /// Directory inside the vault.
  #[arg(short, long, default_value = "")]
  dir: String,
  /// Vault name.
  #[arg(long)]
  vault: Option<String>,
  /// create, append-specific, prepend-specific, overwrite, append-daily, prepend-daily.
  #[arg(short, long, default_value = "create")]
  behavior: SaveBehavior
}

impl NoteArgs {
  fn into_request(self, body: String) -> PlacementRequest {
    let mut request = PlacementRequest::new(body, self.name)
      .directory(self.dir)
      .behavior(self.behavior);
    if let Some(vault) = self.vault {
      request = request.vault(vault);
    }
    request
  }

  fn read_body(&self) -> anyhow::Result<String> {
    match &self.file {
      Some(path) => {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
      }
      None => {
        let mut body = String::new();
        std::io::stdin()
          .read_to_string(&mut body)
          .context("reading note body from stdin")?;
        Ok(body)
      }
    }
  }
}

fn init_tracing(verbose: u8, logging: &LoggingConfig) -> anyhow::Result<()> {
  let filter = match verbose {
    0 => logging.level.as_str(),
    1 => "debug",
    _ => "trace"
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  match &logging.log_file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    }
  }
  Ok(())
}

/// Settings file, then environment/flags on top.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
  let mut settings = match &cli.config {
    Some(path) => Settings::load(path)?,
    None => Settings::default()
  };
  if let Some(url) = &cli.url {
    settings.remote.base_url.clone_from(url);
  }
  if let Some(key) = &cli.api_key {
    settings.remote.api_key.clone_from(key);
  }
  Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let settings = load_settings(&cli)?;
  init_tracing(cli.verbose, &settings.logging)?;
  debug!(config = ?cli.config, remote = ?settings.remote, "settings loaded");

  match cli.command {
    Commands::Check => cmd_check(settings.remote).await,
    Commands::Place(args) => cmd_place(settings.remote, args).await,
    Commands::Plan(args) => cmd_plan(settings.remote, args).await,
    Commands::GenConfig => cmd_gen_config()
  }
}

/// check command — connection test.
async fn cmd_check(remote: RemoteConfig) -> anyhow::Result<()> {
  let placer = noteplace_rest::connect(remote)?;
  let result = placer.test_connection().await;
  if let Some(e) = result.error {
    anyhow::bail!("connection failed: {e}");
  }
  println!("connected to {}", placer.remote().base_url());
  Ok(())
}

/// place command — full pipeline.
async fn cmd_place(remote: RemoteConfig, args: NoteArgs) -> anyhow::Result<()> {
  let body = args.read_body()?;
  let request = args.into_request(body);
  let placer = noteplace_rest::connect(remote)?;

  let result = placer.place(&request).await;
  if !result.success {
    anyhow::bail!(
      "placement failed: {}",
      result.error.as_deref().unwrap_or("unknown error")
    );
  }

  if let Some(placement) = result.placement {
    info!(basis = ?placement.basis, "done");
    println!("{} {}", placement.method, placement.target);
  }
  Ok(())
}

/// plan command — resolve only, print JSON.
async fn cmd_plan(remote: RemoteConfig, args: NoteArgs) -> anyhow::Result<()> {
  let body = args.read_body()?;
  let request = args.into_request(body);
  let placer = noteplace_rest::connect(remote)?;

  let plan = placer.plan(&request).await.context("resolving placement")?;
  println!("{}", serde_json::to_string_pretty(&plan)?);
  Ok(())
}

/// gen-config command — example settings.
fn cmd_gen_config() -> anyhow::Result<()> {
  let mut settings = Settings::default();
  settings.remote.base_url = "https://127.0.0.1:27124".to_string();
  settings.remote.api_key = "your-api-key".to_string();
  settings.logging.log_file = Some(PathBuf::from("noteplace.log"));

  println!("{}", serde_json::to_string_pretty(&settings)?);
  Ok(())
}
