use crate::engine::{GameState, Phase};
use crate::snake::Direction;
use crate::{Cell, Coords};

/// What a drawing collaborator needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub grid_count: Cell,
    /// Head first.
    pub snake: Vec<Coords>,
    pub heading: Direction,
    /// `None` once the food is under the snake, which only happens on a full board.
    pub food: Option<Coords>,
    pub score_text: String,
    pub phase: Phase,
}

impl Frame {
    pub fn head(&self) -> Coords {
        self.snake[0]
    }
}

pub fn render(state: &GameState, grid_count: Cell) -> Frame {
    let food = if state.snake.contains(&state.food) { None } else { Some(state.food) };
    // The head points where the snake last went, not at a turn still queued.
    let heading = if state.heading == Direction::Still { state.direction } else { state.heading };

    Frame {
        grid_count,
        snake: state.snake.body().to_vec(),
        heading,
        food,
        score_text: format!("Score: {}", state.score),
        phase: state.phase,
    }
}
