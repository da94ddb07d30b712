pub mod cache;
pub mod config;
pub mod control;
pub mod engine;
pub mod render;
pub mod snake;
pub mod ticker;

/// Signed grid coordinate, so a head that left the board is still representable.
pub type Cell = i16;
pub type Coords = (Cell, Cell);
