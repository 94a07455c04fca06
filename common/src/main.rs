use minesweeper_agent::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows every resolution pass.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- 1. Initialization ---
    let config = GameConfig::from_env()?;
    let mut game = Game::new(config)?;

    tracing::info!(
        height = config.height,
        width = config.width,
        mines = config.mines,
        seed = ?config.seed,
        "starting autonomous minesweeper agent"
    );

    // --- 2. Game Loop ---
    let mut move_count = 0;
    loop {
        match game.step()? {
            Step::Revealed {
                cell,
                clue,
                deduced,
            } => {
                move_count += 1;
                let agent = game.agent();
                let kind = if deduced { "safe" } else { "guess" };
                tracing::info!(
                    move_count,
                    %cell,
                    clue,
                    kind,
                    known_safes = agent.safes().len(),
                    known_mines = agent.mines().len(),
                    clauses = agent.knowledge().len(),
                    "revealed cell"
                );
            }
            Step::Detonated { cell } => {
                tracing::info!(move_count, %cell, "agent hit a mine");
                break;
            }
            Step::Stuck => {
                tracing::info!(move_count, "no valid moves left");
                break;
            }
            Step::Over(_) => break,
        }
    }

    // --- 3. Final Result ---
    match game.state() {
        GameState::Won => tracing::info!(move_count, "the agent won"),
        GameState::Lost => tracing::info!(move_count, "the agent lost"),
        GameState::Playing => tracing::warn!(move_count, "the game ended unexpectedly"),
    }

    Ok(())
}
