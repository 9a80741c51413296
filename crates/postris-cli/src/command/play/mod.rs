use std::path::PathBuf;

use postris_engine::GameState;

use crate::{command::GameArgs, tui::Runtime, ui::widgets::format_time};

use self::app::PlayApp;

mod app;
mod screen;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    game: GameArgs,
    /// Write logs to this file (the terminal is used by the game)
    #[clap(long)]
    pub(super) log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let config = arg.game.load()?;
    let state = GameState::from_config(&config)?;

    let mut app = PlayApp::new(state);
    Runtime::new().run(&mut app)?;

    let state = app.state();
    println!(
        "score: {}  lines: {}  level: {}  pieces: {}  time: {}",
        state.score(),
        state.lines(),
        state.level(),
        state.count(),
        format_time(state.time()),
    );
    Ok(())
}
