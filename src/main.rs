use anyhow::Result;
use clap::Parser;
use memory_match::config::CliConfig;
use memory_match::{Config, GameInterface, VERSION};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "memory-match")]
#[command(about = "A terminal memory match card game")]
#[command(version = VERSION)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Player name used for submitted scores
    #[arg(short, long)]
    player: Option<String>,

    /// Number of pairs dealt per round
    #[arg(long)]
    pairs: Option<usize>,

    /// Fixed deck seed
    #[arg(long)]
    seed: Option<u64>,

    /// UI theme
    #[arg(short, long)]
    theme: Option<String>,

    /// Directory holding saved scores
    #[arg(long)]
    scores_dir: Option<PathBuf>,

    /// Print the leaderboard and exit
    #[arg(short, long)]
    leaderboard: bool,
}

impl Cli {
    fn overrides(&self) -> CliConfig {
        CliConfig {
            scores_dir: self.scores_dir.clone(),
            log_level: None,
            debug: self.debug,
            theme: self.theme.clone(),
            pairs: self.pairs,
            seed: self.seed,
            player_name: self.player.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.merge_with_cli(cli.overrides());
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("memory_match={},warn", config.logging.level))
        .init();

    info!("Starting Memory Match v{}", VERSION);

    let mut game_interface = GameInterface::new(config)?;

    if cli.leaderboard {
        game_interface.show_leaderboard().await?;
        return Ok(());
    }

    if let Err(e) = game_interface.run().await {
        error!("Game error: {}", e);
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }

    info!("Game session ended");
    Ok(())
}
