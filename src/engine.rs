//! Game state and the per-tick transition.
//!
//! `Engine` owns the only `GameState`. It never touches the clock: every
//! transition that needs the timer restarted or stopped says so through the
//! returned interval or `TickOutcome`, and the caller holding the `Ticker`
//! acts on it.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::snake::{Direction, MoveResult, Snake};
use crate::Coords;

/// Random draws before `place_food` switches to enumerating the free cells.
pub const MAX_FOOD_SAMPLES: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOverCause {
    Wall,
    SelfCollision,
    /// The snake covers every cell, no food can be placed.
    BoardFull,
}

#[derive(Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing moved: the game is over or no direction was given yet.
    Idle,
    Moved,
    Ate { score: u32, new_interval: Option<Duration> },
    GameOver { final_score: u32, cause: GameOverCause },
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub snake: Snake,
    pub food: Coords,
    pub direction: Direction,
    /// Direction of the last executed move.
    pub heading: Direction,
    pub score: u32,
    pub speed_ms: u64,
    pub phase: Phase,
    pub cause: Option<GameOverCause>,
}

impl GameState {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

pub struct Engine {
    config: GameConfig,
    rng: StdRng,
    state: GameState,
}

impl Engine {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Self {
        let state = fresh_state(&config, &mut rng);
        Engine { config, rng, state }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Throws the current state away and starts over. Returns the interval
    /// the tick timer has to be restarted with.
    pub fn initialize(&mut self) -> Duration {
        self.state = fresh_state(&self.config, &mut self.rng);
        info!("[Engine] New game, food at {:?}", self.state.food);
        self.state.interval()
    }

    /// Accepts a turn unless it is colinear with the current direction.
    /// Turning straight back against the last executed move is refused too,
    /// so two quick presses cannot reverse the snake within one tick.
    /// Returns whether the direction changed.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        let state = &mut self.state;
        if !state.is_running() || direction == Direction::Still {
            return false;
        }
        if direction.is_colinear(state.direction) {
            return false;
        }
        if direction == state.heading.opposite() {
            return false;
        }

        state.direction = direction;
        true
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running() || self.state.direction == Direction::Still {
            return TickOutcome::Idle;
        }

        let direction = self.state.direction;
        let food = self.state.food;
        let res = self.state.snake.move_step(direction, self.config.grid_count, |head| head == food);

        match res {
            MoveResult::HitWall { at } => {
                debug!("[Engine] Hit the wall at {:?}", at);
                self.finish(GameOverCause::Wall)
            }
            MoveResult::HitSelf { at } => {
                debug!("[Engine] Ran into itself at {:?}", at);
                self.finish(GameOverCause::SelfCollision)
            }
            MoveResult::Moved { old_tail: Some(_), .. } => {
                self.state.heading = direction;
                TickOutcome::Moved
            }
            MoveResult::Moved { new_head, old_tail: None } => {
                self.state.heading = direction;
                self.state.score += 1;
                debug!("[Engine] Ate food at {:?}, score {}", new_head, self.state.score);

                match self.place_food() {
                    Some(pos) => self.state.food = pos,
                    None => return self.finish(GameOverCause::BoardFull),
                }

                let new_interval = self.speed_up();
                TickOutcome::Ate { score: self.state.score, new_interval }
            }
        }
    }

    /// Picks a free cell for the food without placing it.
    pub fn place_food(&mut self) -> Option<Coords> {
        place_food(&self.config, &mut self.rng, &self.state.snake)
    }

    fn speed_up(&mut self) -> Option<Duration> {
        let state = &mut self.state;
        if state.score % self.config.speed_up_every != 0 || state.speed_ms <= self.config.min_speed_ms {
            return None;
        }

        let faster = state.speed_ms.saturating_sub(self.config.speed_step_ms);
        state.speed_ms = faster.max(self.config.min_speed_ms);
        info!("[Engine] Speed up to {}ms at score {}", state.speed_ms, state.score);
        Some(state.interval())
    }

    fn finish(&mut self, cause: GameOverCause) -> TickOutcome {
        let state = &mut self.state;
        state.phase = Phase::GameOver;
        state.cause = Some(cause);
        info!("[Engine] Game over ({:?}), final score {}", cause, state.score);
        TickOutcome::GameOver { final_score: state.score, cause }
    }
}

fn fresh_state(config: &GameConfig, rng: &mut StdRng) -> GameState {
    let snake = Snake::new(config.start);
    // A single segment never fills a valid grid.
    let food = place_food(config, rng, &snake).unwrap_or(config.start);

    GameState {
        snake,
        food,
        direction: Direction::Still,
        heading: Direction::Still,
        score: 0,
        speed_ms: config.base_speed_ms,
        phase: Phase::Running,
        cause: None,
    }
}

/// Uniform random cell not covered by `snake`, or `None` when there is none.
pub fn place_food<R: Rng>(config: &GameConfig, rng: &mut R, snake: &Snake) -> Option<Coords> {
    let n = config.grid_count;

    for _ in 0..MAX_FOOD_SAMPLES {
        let pos = (rng.gen_range(0..n), rng.gen_range(0..n));
        if !snake.contains(&pos) {
            return Some(pos);
        }
    }

    // Crowded board: choose among what is left.
    let free: Vec<Coords> = (0..n)
        .flat_map(|y| (0..n).map(move |x| (x, y)))
        .filter(|pos| !snake.contains(pos))
        .collect();
    free.choose(rng).copied()
}
