use std::io::{self, Write as _};

use anyhow::ensure;
use postris_engine::{
    Action, ActionResult, Direction, GameConfig, GameState, Rotation, ShapeSeed, UniformSource,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{debug, info};

use crate::command::GameArgs;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    game: GameArgs,
    /// Number of games to play
    #[clap(long, default_value_t = 1)]
    games: usize,
    /// Stop a game after this many actions even if it is not over
    #[clap(long, default_value_t = 10_000)]
    max_actions: usize,
    /// Send a gravity tick after every N inputs
    #[clap(long, default_value_t = 4)]
    tick_every: usize,
    /// Also print every action and its result
    #[clap(long)]
    trace: bool,
}

/// Final numbers of one simulated game.
#[derive(Debug, Clone, Serialize)]
struct GameSummary {
    game: usize,
    seed: ShapeSeed,
    score: usize,
    lines: usize,
    level: usize,
    pieces: usize,
    actions: usize,
    time_secs: f64,
    game_over: bool,
}

#[derive(Debug, Serialize)]
struct TraceRecord<'a> {
    game: usize,
    step: usize,
    action: Action,
    result: &'a ActionResult,
}

/// Inputs the random player picks from. Horizontal moves are listed twice
/// so pieces spread over the matrix instead of piling up in the middle.
const INPUTS: &[Action] = &[
    Action::Move(Direction::Left),
    Action::Move(Direction::Left),
    Action::Move(Direction::Right),
    Action::Move(Direction::Right),
    Action::Rotate(Rotation::Clockwise),
    Action::Rotate(Rotation::CounterClockwise),
    Action::Fall,
    Action::Drop,
    Action::Hold,
];

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        game,
        games,
        max_actions,
        tick_every,
        trace,
    } = arg;
    ensure!(*tick_every > 0, "--tick-every must be at least 1");

    let config = game.load()?;
    // Every game's seed derives from the configured one, so a whole batch is reproducible
    let master_seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut master = Pcg32::from_seed(master_seed.to_bytes());
    info!(%master_seed, games, "starting simulation");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for game in 0..*games {
        let seed: ShapeSeed = master.random();
        let mut policy = Pcg32::seed_from_u64(master.random());
        let summary = play_game(
            game,
            &config,
            seed,
            &mut policy,
            *max_actions,
            *tick_every,
            |record| {
                if *trace {
                    serde_json::to_writer(&mut out, &record)?;
                    writeln!(out)?;
                }
                Ok(())
            },
        )?;
        info!(game, score = summary.score, lines = summary.lines, "game finished");
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
    }
    Ok(())
}

fn play_game<R, F>(
    game: usize,
    config: &GameConfig,
    seed: ShapeSeed,
    policy: &mut R,
    max_actions: usize,
    tick_every: usize,
    mut on_action: F,
) -> anyhow::Result<GameSummary>
where
    R: Rng,
    F: FnMut(TraceRecord<'_>) -> anyhow::Result<()>,
{
    let mut state = GameState::with_config(config, UniformSource::with_seed(seed))?;
    let mut actions = 0;
    while actions < max_actions && !state.is_game_over() {
        let action = if (actions + 1) % tick_every == 0 {
            // Gravity ticks stand in for the time a real player would spend
            state.advance_time(state.gravity_interval());
            Action::Elapsed
        } else {
            INPUTS[policy.random_range(0..INPUTS.len())]
        };
        let result = state.perform(action)?;
        on_action(TraceRecord {
            game,
            step: actions,
            action,
            result: &result,
        })?;
        actions += 1;
    }
    debug!(game, actions, game_over = state.is_game_over(), "game ended");

    Ok(GameSummary {
        game,
        seed,
        score: state.score(),
        lines: state.lines(),
        level: state.level(),
        pieces: state.count(),
        actions,
        time_secs: state.time().as_secs_f64(),
        game_over: state.is_game_over(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate(seed: u8, max_actions: usize) -> (GameSummary, Vec<String>) {
        let mut policy = Pcg32::seed_from_u64(u64::from(seed));
        let mut trace = vec![];
        let summary = play_game(
            0,
            &GameConfig::default(),
            ShapeSeed::from_bytes([seed; 16]),
            &mut policy,
            max_actions,
            4,
            |record| {
                trace.push(serde_json::to_string(&record)?);
                Ok(())
            },
        )
        .unwrap();
        (summary, trace)
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let (a, a_trace) = simulate(9, 500);
        let (b, b_trace) = simulate(9, 500);
        assert_eq!(a_trace, b_trace);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_simulation_stops_at_the_action_limit_or_game_over() {
        let (summary, trace) = simulate(1, 50);
        assert_eq!(summary.actions, trace.len());
        assert!(summary.actions == 50 || summary.game_over);

        let (summary, _) = simulate(2, 100_000);
        assert!(summary.game_over);
        assert!(summary.actions < 100_000);
        assert!(summary.pieces > 0);
    }

    #[test]
    fn test_every_fourth_action_is_a_tick() {
        let (_, trace) = simulate(5, 8);
        assert!(trace[3].contains(r#""action":"Elapsed""#));
        assert!(trace[7].contains(r#""action":"Elapsed""#));
    }
}
