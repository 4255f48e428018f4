use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use copas_bot::AutoStrategy;
use copas_core::model::node::NodeId;
use copas_node::config::RingConfig;
use copas_node::logging::init_logging;
use copas_node::runtime;

/// One peer of the four-node copas ring.
#[derive(Debug, Parser)]
#[command(
    name = "copas-node",
    author,
    version,
    about = "Hearts over a unidirectional UDP ring"
)]
struct Cli {
    /// Path to the YAML ring file shared by all four peers.
    #[arg(short, long, value_name = "FILE", default_value = "copas.yaml")]
    config: PathBuf,

    /// This peer's id (0..3). Peer 0 coordinates.
    #[arg(long, value_name = "ID")]
    id: u8,

    /// Override the shuffle seed (coordinator only).
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the score limit that ends the game.
    #[arg(long, value_name = "POINTS")]
    score_limit: Option<u16>,

    /// Exit after validating the ring file.
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = RingConfig::from_path(&cli.config)
        .with_context(|| format!("loading ring file {}", cli.config.display()))?;

    if let Some(seed) = cli.seed {
        config.game.seed = Some(seed);
    }
    if let Some(limit) = cli.score_limit {
        config.game.score_limit = limit;
    }
    config.validate().context("validating overrides")?;

    let Some(self_id) = NodeId::from_wire(cli.id) else {
        bail!("--id must be 0..3, got {}", cli.id);
    };

    init_logging(&config.logging);

    if cli.validate_only {
        println!(
            "Ring file {} is valid: 4 peers, score limit {}.",
            cli.config.display(),
            config.game.score_limit
        );
        return Ok(());
    }

    runtime::run(&config, self_id, Box::new(AutoStrategy::new()))
}
