//! Solver for Rush Hour style sliding-block puzzles: slide the target
//! vehicle `X` off the right edge of the board.

mod board;
mod error;
mod loader;
mod search;

pub use board::{Action, Board, Direction, Orientation, StateKey, Vehicle, VehicleId, TARGET};
pub use error::{BoardError, LoadError};
pub use loader::{load_puzzle, parse_puzzle};
pub use search::{
    a_star, a_star_with_limits, bfs, bfs_with_limits, heuristic, solve, Algorithm, Outcome,
    Search, SearchLimits,
};
