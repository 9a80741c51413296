use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use postris_engine::{GameConfig, ShapeSeed};

use crate::logging::{self, LogTarget};

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Play games with random inputs and print a JSON summary of each
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Options shared by every mode that starts a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArgs {
    /// JSON file with the game config; flags below override its values
    #[clap(long)]
    config: Option<PathBuf>,
    /// Level to start at (1 or more)
    #[clap(long)]
    start_level: Option<usize>,
    /// 32 hex characters seeding the piece sequence
    #[clap(long)]
    seed: Option<ShapeSeed>,
}

impl GameArgs {
    pub(crate) fn load(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => GameConfig::default(),
        };
        if let Some(start_level) = self.start_level {
            config.start_level = start_level;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate().context("invalid game config")?;
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => {
            if let Some(path) = &arg.log_file {
                logging::init(args.verbose, LogTarget::File(path))?;
            }
            play::run(&arg)?;
        }
        Mode::Simulate(arg) => {
            logging::init(args.verbose, LogTarget::Stderr)?;
            simulate::run(&arg)?;
        }
    }
    Ok(())
}
