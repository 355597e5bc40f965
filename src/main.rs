use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chipnet_config::NetDef;
use chipnet_net::{AllowAll, Consumer, Graph, Net, NetError, RouteConsumer};

/// Chipnet - a restricted Petri net engine for workflow-style processes
#[derive(Parser)]
#[command(name = "chipnet")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a net definition and print its shape
  Validate {
    /// Path to the net definition file (JSON)
    net_file: PathBuf,
  },

  /// Start a net and move its chip through the given places
  Run {
    /// Path to the net definition file (JSON)
    net_file: PathBuf,

    /// Place to deposit into, in order
    #[arg(long = "place")]
    places: Vec<String>,

    /// Transition the consumer enables (all transitions when omitted)
    #[arg(long = "allow")]
    allowed: Vec<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Validate { net_file }) => validate(net_file)?,
    Some(Commands::Run {
      net_file,
      places,
      allowed,
    }) => run(net_file, places, allowed)?,
    None => {
      println!("chipnet - use --help to see available commands");
    }
  }

  Ok(())
}

fn load(net_file: &Path) -> Result<NetDef> {
  NetDef::load(net_file)
    .with_context(|| format!("failed to load net definition: {}", net_file.display()))
}

fn validate(net_file: PathBuf) -> Result<()> {
  let def = load(&net_file)?;
  let graph = Graph::from_def(&def).context("invalid net definition")?;

  eprintln!(
    "Net is valid: {} places, {} transitions",
    graph.place_count(),
    graph.transition_count()
  );

  let summary = serde_json::json!({
    "start": graph.start().id(),
    "finish": graph.finish_places().map(|p| p.id()).collect::<Vec<_>>(),
    "joins": graph.transitions().filter(|t| t.is_join()).map(|t| t.id()).collect::<Vec<_>>(),
    "forks": graph.transitions().filter(|t| t.is_fork()).map(|t| t.id()).collect::<Vec<_>>(),
    "choices": graph
      .places()
      .filter(|p| p.to_transitions().len() > 1)
      .map(|p| p.id())
      .collect::<Vec<_>>(),
  });
  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}

fn run(net_file: PathBuf, places: Vec<String>, allowed: Vec<String>) -> Result<()> {
  let def = load(&net_file)?;

  let consumer: Arc<dyn Consumer> = if allowed.is_empty() {
    Arc::new(AllowAll)
  } else {
    Arc::new(RouteConsumer::with_routes(allowed))
  };
  let mut net = Net::build(&def)
    .context("invalid net definition")?
    .with_consumer(consumer);

  let outcome = drive(&mut net, &places);

  info!(net_id = %net.id(), state = ?net.state(), "net stopped");

  let output = serde_json::json!({
    "finished": net.is_finished(),
    "state": net.state(),
    "error": net.error().map(|e| serde_json::json!({ "code": e.code(), "message": e.to_string() })),
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  outcome.map_err(|e| match net.error() {
    Some(cause) => anyhow::Error::new(cause.clone()).context(e),
    None => anyhow::Error::new(e),
  })
}

fn drive(net: &mut Net, places: &[String]) -> Result<(), NetError> {
  net.start()?;
  info!(net_id = %net.id(), place_id = %net.graph().start().id(), "net started");

  for place in places {
    let finished = net.set_place(place)?;
    info!(net_id = %net.id(), place_id = %place, finished, "chip moved");
  }

  Ok(())
}
