use std::{
    fmt::{Display, Write},
    ops::Index,
};

use itertools::Itertools;
use smallvec::{Array, SmallVec};

use crate::error::BoardError;

pub type VehicleId = char;

/// The vehicle that has to leave through the right edge.
pub const TARGET: VehicleId = 'X';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A one-cell slide direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The orientation a vehicle needs to slide this way.
    pub fn axis(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Up => 'U',
            Direction::Down => 'D',
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.tag())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    pub vehicle: VehicleId,
    pub direction: Direction,
}

impl Action {
    pub fn new(vehicle: VehicleId, direction: Direction) -> Action {
        Action { vehicle, direction }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.vehicle, self.direction)
    }
}

/// A rigid block. `(x, y)` is the top-left cell of its footprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    pub id: VehicleId,
    pub x: usize,
    pub y: usize,
    pub orientation: Orientation,
    pub length: usize,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        x: usize,
        y: usize,
        orientation: Orientation,
        length: usize,
    ) -> Vehicle {
        Vehicle {
            id,
            x,
            y,
            orientation,
            length,
        }
    }

    pub fn horizontal(id: VehicleId, x: usize, y: usize, length: usize) -> Vehicle {
        Vehicle::new(id, x, y, Orientation::Horizontal, length)
    }

    pub fn vertical(id: VehicleId, x: usize, y: usize, length: usize) -> Vehicle {
        Vehicle::new(id, x, y, Orientation::Vertical, length)
    }

    /// Occupied cells as `(x, y)`, starting from the top-left one. Only
    /// vehicles that fit on a board are guaranteed not to overflow.
    #[auto_enums::auto_enum(Iterator)]
    pub fn footprint(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x, y) = (self.x, self.y);
        match self.orientation {
            Orientation::Horizontal => (x..x + self.length).map(move |cx| (cx, y)),
            Orientation::Vertical => (y..y + self.length).map(move |cy| (x, cy)),
        }
    }

    /// First footprint cell outside a `width` x `height` board, found without
    /// walking (or overflowing) the footprint.
    fn first_cell_outside(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        let (along, across, limit, cross_limit) = match self.orientation {
            Orientation::Horizontal => (self.x, self.y, width, height),
            Orientation::Vertical => (self.y, self.x, height, width),
        };

        let outside = if across >= cross_limit {
            along
        } else if along
            .checked_add(self.length)
            .map_or(true, |end| end > limit)
        {
            along.max(limit)
        } else {
            return None;
        };

        Some(match self.orientation {
            Orientation::Horizontal => (outside, self.y),
            Orientation::Vertical => (self.x, outside),
        })
    }

    /// The cell this vehicle would enter when sliding one step, if it is on
    /// the non-negative side of the grid.
    fn leading_cell(&self, direction: Direction) -> Option<(usize, usize)> {
        match direction {
            Direction::Left => self.x.checked_sub(1).map(|x| (x, self.y)),
            Direction::Right => Some((self.x + self.length, self.y)),
            Direction::Up => self.y.checked_sub(1).map(|y| (self.x, y)),
            Direction::Down => Some((self.x, self.y + self.length)),
        }
    }
}

/// Order-independent fingerprint of vehicle placements.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey(SmallVec<[(VehicleId, usize, usize); 16]>);

/// One puzzle state. Boards are never mutated; moves build new ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    vehicles: Vec<Vehicle>,
    grid: Vec<Option<VehicleId>>,
    target: usize,
}

impl Board {
    /// Builds a board of `height` rows and `width` columns, in the order a
    /// puzzle definition lists them.
    pub fn new(height: usize, width: usize, vehicles: Vec<Vehicle>) -> Result<Board, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard { width, height });
        }

        for (ix, vehicle) in vehicles.iter().enumerate() {
            if vehicle.length == 0 {
                return Err(BoardError::ZeroLength { id: vehicle.id });
            }
            if vehicles[..ix].iter().any(|v| v.id == vehicle.id) {
                return Err(BoardError::DuplicateVehicle { id: vehicle.id });
            }
        }

        let grid = build_grid(width, height, &vehicles)?;

        let target = vehicles
            .iter()
            .position(|v| v.id == TARGET)
            .ok_or(BoardError::MissingTarget)?;
        if vehicles[target].orientation != Orientation::Horizontal {
            return Err(BoardError::TargetNotHorizontal);
        }

        Ok(Board {
            width,
            height,
            vehicles,
            grid,
            target,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn target(&self) -> &Vehicle {
        &self.vehicles[self.target]
    }

    /// What occupies `(x, y)`, or `None` outside the board.
    pub fn cell(&self, x: usize, y: usize) -> Option<Option<VehicleId>> {
        (x < self.width && y < self.height).then(|| self[(x, y)])
    }

    pub fn is_goal(&self) -> bool {
        let target = self.target();
        target.x + target.length == self.width
    }

    pub fn key(&self) -> StateKey {
        StateKey(
            self.vehicles
                .iter()
                .map(|v| (v.id, v.x, v.y))
                .sorted()
                .collect(),
        )
    }

    /// Copy of this board with vehicle `id` shifted by `(dx, dy)`. The result
    /// is validated from scratch, so illegal shifts are reported rather than
    /// trusted.
    pub fn moved(&self, id: VehicleId, dx: isize, dy: isize) -> Result<Board, BoardError> {
        let ix = self
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(BoardError::UnknownVehicle(id))?;

        let mut vehicles = self.vehicles.clone();
        let vehicle = &mut vehicles[ix];
        match (
            vehicle.x.checked_add_signed(dx),
            vehicle.y.checked_add_signed(dy),
        ) {
            (Some(x), Some(y)) => {
                vehicle.x = x;
                vehicle.y = y;
            }
            _ => {
                return Err(BoardError::OutOfBounds {
                    id,
                    x: vehicle.x as i128 + dx as i128,
                    y: vehicle.y as i128 + dy as i128,
                })
            }
        }

        let grid = build_grid(self.width, self.height, &vehicles)?;
        Ok(Board {
            width: self.width,
            height: self.height,
            vehicles,
            grid,
            target: self.target,
        })
    }

    /// Applies one action, refusing slides across a vehicle's axis.
    pub fn apply(&self, action: Action) -> Result<Board, BoardError> {
        let vehicle = self
            .vehicle(action.vehicle)
            .ok_or(BoardError::UnknownVehicle(action.vehicle))?;
        if vehicle.orientation != action.direction.axis() {
            return Err(BoardError::WrongAxis {
                id: action.vehicle,
                direction: action.direction,
            });
        }

        let (dx, dy) = action.direction.offset();
        self.moved(action.vehicle, dx, dy)
    }

    /// Every board along `actions`, starting with a copy of `self`.
    pub fn replay(&self, actions: &[Action]) -> Result<Vec<Board>, BoardError> {
        let mut boards = Vec::with_capacity(actions.len() + 1);
        boards.push(self.clone());
        for &action in actions {
            let next = boards[boards.len() - 1].apply(action)?;
            boards.push(next);
        }
        Ok(boards)
    }

    fn can_slide(&self, vehicle: &Vehicle, direction: Direction) -> bool {
        matches!(
            vehicle.leading_cell(direction).and_then(|(x, y)| self.cell(x, y)),
            Some(None)
        )
    }

    /// Pushes every legal one-cell slide, vehicles in board order and
    /// left/right or up/down within a vehicle.
    pub fn successors_into<const N: usize>(&self, out: &mut SmallVec<[(Action, Board); N]>)
    where
        [(Action, Board); N]: Array<Item = (Action, Board)>,
    {
        for vehicle in &self.vehicles {
            let directions = match vehicle.orientation {
                Orientation::Horizontal => [Direction::Left, Direction::Right],
                Orientation::Vertical => [Direction::Up, Direction::Down],
            };

            for direction in directions {
                if !self.can_slide(vehicle, direction) {
                    continue;
                }

                let (dx, dy) = direction.offset();
                match self.moved(vehicle.id, dx, dy) {
                    Ok(next) => out.push((Action::new(vehicle.id, direction), next)),
                    Err(err) => unreachable!("legal slide {} {} rejected: {}", vehicle.id, direction, err),
                }
            }
        }
    }

    pub fn successors(&self) -> SmallVec<[(Action, Board); 16]> {
        let mut out = SmallVec::new();
        self.successors_into(&mut out);
        out
    }
}

// vehicles are placed in list order, cells in footprint order, so the first
// conflict reported is deterministic
fn build_grid(
    width: usize,
    height: usize,
    vehicles: &[Vehicle],
) -> Result<Vec<Option<VehicleId>>, BoardError> {
    let cells = width
        .checked_mul(height)
        .ok_or(BoardError::TooLarge { width, height })?;

    let mut grid = vec![None; cells];
    for vehicle in vehicles {
        // NB: after this the footprint cannot overflow
        if let Some((x, y)) = vehicle.first_cell_outside(width, height) {
            return Err(BoardError::OutOfBounds {
                id: vehicle.id,
                x: x as i128,
                y: y as i128,
            });
        }

        for (x, y) in vehicle.footprint() {
            let cell = &mut grid[y * width + x];
            if let Some(first) = *cell {
                return Err(BoardError::Overlap {
                    first,
                    second: vehicle.id,
                    x,
                    y,
                });
            }
            *cell = Some(vehicle.id);
        }
    }

    Ok(grid)
}

/// Indexed by `(x, y)`.
impl Index<(usize, usize)> for Board {
    type Output = Option<VehicleId>;
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.grid[index.1 * self.width + index.0]
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for row in self.grid.chunks(self.width) {
            if !first {
                f.write_char('\n')?;
            } else {
                first = false;
            }

            write!(f, "{}", row.iter().map(|c| c.unwrap_or('.')).join(" "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Board {
        Board::new(
            6,
            6,
            vec![
                Vehicle::horizontal('X', 0, 2, 2),
                Vehicle::vertical('A', 2, 1, 2),
                Vehicle::vertical('B', 4, 2, 3),
                Vehicle::horizontal('C', 1, 5, 3),
                Vehicle::horizontal('D', 2, 0, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn footprints_fit_the_board() {
        let board = sample();
        for vehicle in board.vehicles() {
            let cells = vehicle.footprint().collect::<Vec<_>>();
            assert_eq!(cells.len(), vehicle.length);
            assert!(cells
                .iter()
                .all(|&(x, y)| x < board.width() && y < board.height()));
            assert!(cells.iter().all(|&(x, y)| board[(x, y)] == Some(vehicle.id)));
        }

        assert_eq!(
            Vehicle::vertical('B', 4, 2, 3).footprint().collect::<Vec<_>>(),
            vec![(4, 2), (4, 3), (4, 4)]
        );
    }

    #[test]
    fn rejects_vehicles_off_the_board() {
        let result = Board::new(
            6,
            6,
            vec![
                Vehicle::horizontal('X', 0, 2, 2),
                Vehicle::vertical('A', 5, 4, 3),
            ],
        );
        assert_eq!(
            result,
            Err(BoardError::OutOfBounds { id: 'A', x: 5, y: 6 })
        );
    }

    #[test]
    fn rejects_coordinates_near_usize_max() {
        let target = Vehicle::horizontal('X', 0, 2, 2);
        assert_eq!(
            Board::new(6, 6, vec![target.clone(), Vehicle::horizontal('A', usize::MAX, 0, 2)]),
            Err(BoardError::OutOfBounds {
                id: 'A',
                x: usize::MAX as i128,
                y: 0
            })
        );
        assert_eq!(
            Board::new(6, 6, vec![target.clone(), Vehicle::vertical('A', 0, usize::MAX - 1, 3)]),
            Err(BoardError::OutOfBounds {
                id: 'A',
                x: 0,
                y: usize::MAX as i128 - 1
            })
        );
        assert_eq!(
            Board::new(6, 6, vec![target.clone(), Vehicle::horizontal('A', 2, usize::MAX, 2)]),
            Err(BoardError::OutOfBounds {
                id: 'A',
                x: 2,
                y: usize::MAX as i128
            })
        );
        assert_eq!(
            Board::new(6, 6, vec![target, Vehicle::horizontal('A', 3, 0, usize::MAX)]),
            Err(BoardError::OutOfBounds { id: 'A', x: 6, y: 0 })
        );
    }

    #[test]
    fn rejects_boards_too_large_to_index() {
        assert_eq!(
            Board::new(usize::MAX, 2, vec![Vehicle::horizontal('X', 0, 0, 2)]),
            Err(BoardError::TooLarge {
                width: 2,
                height: usize::MAX
            })
        );
    }

    #[test]
    fn reports_first_overlap() {
        let result = Board::new(
            6,
            6,
            vec![
                Vehicle::horizontal('X', 0, 2, 3),
                Vehicle::vertical('A', 1, 0, 3),
                Vehicle::vertical('B', 2, 2, 2),
            ],
        );
        assert_eq!(
            result,
            Err(BoardError::Overlap {
                first: 'X',
                second: 'A',
                x: 1,
                y: 2
            })
        );
    }

    #[test]
    fn rejects_bad_definitions() {
        assert_eq!(
            Board::new(0, 6, vec![]),
            Err(BoardError::EmptyBoard { width: 6, height: 0 })
        );
        assert_eq!(
            Board::new(6, 6, vec![Vehicle::horizontal('A', 0, 0, 2)]),
            Err(BoardError::MissingTarget)
        );
        assert_eq!(
            Board::new(6, 6, vec![Vehicle::vertical('X', 0, 0, 2)]),
            Err(BoardError::TargetNotHorizontal)
        );
        assert_eq!(
            Board::new(
                6,
                6,
                vec![
                    Vehicle::horizontal('X', 0, 0, 2),
                    Vehicle::horizontal('X', 0, 1, 2)
                ]
            ),
            Err(BoardError::DuplicateVehicle { id: 'X' })
        );
        assert_eq!(
            Board::new(6, 6, vec![Vehicle::horizontal('X', 0, 0, 0)]),
            Err(BoardError::ZeroLength { id: 'X' })
        );
    }

    #[test]
    fn goal_is_right_edge() {
        let board = Board::new(6, 6, vec![Vehicle::horizontal('X', 3, 2, 2)]).unwrap();
        assert!(!board.is_goal());
        assert!(board.moved('X', 1, 0).unwrap().is_goal());
        assert!(!sample().is_goal());
    }

    #[test]
    fn inverse_moves_restore_key() {
        let board = sample();
        let there = board.moved('B', 0, 1).unwrap();
        assert_ne!(there.key(), board.key());
        let back = there.moved('B', 0, -1).unwrap();
        assert_eq!(back.key(), board.key());
        assert_eq!(back, board);
    }

    #[test]
    fn moved_revalidates() {
        let board = sample();
        assert_eq!(
            board.moved('X', -1, 0),
            Err(BoardError::OutOfBounds { id: 'X', x: -1, y: 2 })
        );
        assert_eq!(
            board.moved('X', 1, 0),
            Err(BoardError::Overlap {
                first: 'X',
                second: 'A',
                x: 2,
                y: 2
            })
        );
        assert_eq!(board.moved('Q', 1, 0), Err(BoardError::UnknownVehicle('Q')));
    }

    #[test]
    fn key_ignores_vehicle_order() {
        let board = sample();
        let mut vehicles = board.vehicles().to_vec();
        vehicles.reverse();
        let reordered = Board::new(6, 6, vehicles).unwrap();

        assert_ne!(board, reordered);
        assert_eq!(board.key(), reordered.key());
        assert_eq!(reordered.key(), board.key());
        assert_eq!(board.key(), board.clone().key());
    }

    #[test]
    fn successors_in_vehicle_order() {
        let actions = sample()
            .successors()
            .into_iter()
            .map(|(action, _)| action.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            actions,
            vec!["A D", "B U", "B D", "C L", "C R", "D L", "D R"]
        );
    }

    #[test]
    fn successors_are_single_slides() {
        let board = sample();
        for (action, next) in board.successors() {
            assert_eq!(next, board.apply(action).unwrap());
            let before = board.vehicle(action.vehicle).unwrap();
            let after = next.vehicle(action.vehicle).unwrap();
            let (dx, dy) = action.direction.offset();
            assert_eq!(after.x as isize - before.x as isize, dx);
            assert_eq!(after.y as isize - before.y as isize, dy);
        }
    }

    #[test]
    fn apply_checks_axis() {
        let board = sample();
        assert_eq!(
            board.apply(Action::new('B', Direction::Left)),
            Err(BoardError::WrongAxis {
                id: 'B',
                direction: Direction::Left
            })
        );

        let down = Action::new('B', Direction::Down);
        let up = Action::new('B', Direction::Down.opposite());
        let boards = board.replay(&[down, up]).unwrap();
        assert_eq!(boards.len(), 3);
        assert_eq!(boards[2], board);
    }

    #[test]
    fn display() {
        let board = Board::new(
            3,
            4,
            vec![
                Vehicle::horizontal('X', 0, 1, 2),
                Vehicle::vertical('A', 3, 0, 3),
            ],
        )
        .unwrap();
        assert_eq!(board.to_string(), ". . . A\nX X . A\n. . . A");
    }
}
