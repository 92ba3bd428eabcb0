use thiserror::Error;

use crate::board::{Direction, VehicleId, TARGET};

/// Reasons a board cannot be built or a vehicle cannot be moved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have a positive size, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },

    #[error("vehicle {id} has zero length")]
    ZeroLength { id: VehicleId },

    #[error("vehicle {id} appears more than once")]
    DuplicateVehicle { id: VehicleId },

    #[error("board of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },

    /// `x` and `y` are the first cell of the footprint outside the board,
    /// which can lie left of or above it after a move.
    #[error("vehicle {id} leaves the board at ({x}, {y})")]
    OutOfBounds { id: VehicleId, x: i128, y: i128 },

    #[error("vehicles {first} and {second} overlap at ({x}, {y})")]
    Overlap {
        first: VehicleId,
        second: VehicleId,
        x: usize,
        y: usize,
    },

    #[error("no target vehicle {}", TARGET)]
    MissingTarget,

    #[error("target vehicle {} must be horizontal", TARGET)]
    TargetNotHorizontal,

    #[error("no vehicle {0} on the board")]
    UnknownVehicle(VehicleId),

    #[error("vehicle {id} cannot move {direction}")]
    WrongAxis { id: VehicleId, direction: Direction },
}

/// Reasons a puzzle definition cannot be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("puzzle definition is empty")]
    Empty,

    #[error("cannot read puzzle definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {value:?} is not a valid number")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: {value:?} is not a single-character vehicle id")]
    InvalidId { line: usize, value: String },

    #[error("line {line}: {value:?} is not an orientation (expected H or V)")]
    InvalidOrientation { line: usize, value: String },

    #[error(transparent)]
    Board(#[from] BoardError),
}
