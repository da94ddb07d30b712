mod game;
mod term;

use std::fs::File;

use anyhow::{Context, Result};
use snake_grid::config::GameConfig;

use game::Next;

pub type TermInt = u16;

const DEFAULT_LOG_FILE: &str = "snake.log";

fn main() -> Result<()> {
    let config = GameConfig::load_default()?;
    init_logging(&config)?;
    log::info!("[Main] Starting with {:?}", config);

    let mut game = game::SnakeGame::new(config)?;
    game.initialize()?;

    let res = run(&mut game);
    // The terminal goes back to normal before any error is printed
    game.restore()?;
    res
}

fn run(game: &mut game::SnakeGame) -> Result<()> {
    if let Next::Quit = game.show_intro()? {
        return Ok(());
    }

    loop {
        if let Next::Quit = game.play()? {
            return Ok(());
        }
    }
}

/// Logs go to a file, stderr would draw over the game screen.
fn init_logging(config: &GameConfig) -> Result<()> {
    let path = config.log_file.clone().unwrap_or_else(|| DEFAULT_LOG_FILE.into());
    let file = File::create(&path).with_context(|| format!("create log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
