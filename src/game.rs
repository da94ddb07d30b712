use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use log::{debug, info};

use crate::term::TermManager;
use crate::TermInt;
use snake_grid::config::GameConfig;
use snake_grid::control;
use snake_grid::engine::{Engine, GameOverCause, TickOutcome};
use snake_grid::render::render;
use snake_grid::snake::Direction::{self, *};
use snake_grid::ticker::Ticker;

const POLL_INTERVAL_MS: u64 = 5;

/// What the player asked for at the end of a round.
pub enum Next {
    PlayAgain,
    Quit,
}

/// Owns the engine, the single tick timer and the terminal.
pub struct SnakeGame {
    engine: Engine,
    ticker: Ticker,
    paused: bool,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        Ok(SnakeGame {
            engine: Engine::new(config),
            ticker: Ticker::new(),
            paused: false,
            term: TermManager::new()?,
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()?;
        let cells = self.engine.config().grid_count as TermInt;
        if let Err(e) = self.term.draw_board(cells) {
            self.term.restore()?;
            return Err(e);
        }
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.ticker.stop();
        self.term.restore()
    }

    pub fn show_intro(&mut self) -> Result<Next> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "CTRL+C or Q to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        if is_quit(&self.term.read_key_blocking()?) {
            return Ok(Next::Quit);
        }

        self.term.hide_message()?;
        Ok(Next::PlayAgain)
    }

    /// Plays one round, from a fresh state to game over.
    pub fn play(&mut self) -> Result<Next> {
        self.paused = false;
        control::restart(&mut self.engine, &mut self.ticker, Instant::now());

        let cells = self.engine.config().grid_count as TermInt;
        self.term.draw_board(cells)?;
        self.draw()?;

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if is_quit(&key_ev) {
                    return Ok(Next::Quit);
                }
                match key_ev.code {
                    KeyCode::Esc => self.toggle_pause()?,
                    code => {
                        if let Some(dir) = direction_for(code) {
                            if !self.paused && self.engine.set_direction(dir) {
                                debug!("[Game] Direction set to {:?}", dir);
                            }
                        }
                    }
                }
            }

            match control::step(&mut self.engine, &mut self.ticker, Instant::now()) {
                None => continue,
                Some(TickOutcome::GameOver { final_score, cause }) => {
                    self.game_over(final_score, cause)?;
                    break;
                }
                Some(_) => self.draw()?,
            }
        }

        if is_quit(&self.term.read_key_blocking()?) {
            return Ok(Next::Quit);
        }
        Ok(Next::PlayAgain)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw(&mut self) -> Result<()> {
        let frame = render(self.engine.state(), self.engine.config().grid_count);
        self.term.draw_frame(&frame)
    }

    fn game_over(&mut self, score: u32, cause: GameOverCause) -> Result<()> {
        let frame = render(self.engine.state(), self.engine.config().grid_count);
        self.term.draw_frame(&frame)?;

        let won = cause == GameOverCause::BoardFull;
        if !won {
            self.term.draw_dead_snake(&frame)?;
        }
        info!("[Game] Round over, score {}", score);

        let s = if won {"You won!"} else {"Game over!"};
        self.term.show_message(&[
            s,
            &*format!("Score: {}", score),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ])
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            control::pause(&mut self.ticker);
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
            control::resume(&self.engine, &mut self.ticker, Instant::now());
        }

        self.paused = !self.paused;
        Ok(())
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Up),
        KeyCode::Char('a') | KeyCode::Left => Some(Left),
        KeyCode::Char('s') | KeyCode::Down => Some(Down),
        KeyCode::Char('d') | KeyCode::Right => Some(Right),
        _ => None,
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || matches!(ev, KeyEvent { code: KeyCode::Char('q'), .. })
}
