use std::{fs, path::Path};

use itertools::Itertools;
use log::debug;

use crate::{
    board::{Board, Orientation, Vehicle, VehicleId},
    error::LoadError,
};

// Format:
// first row is `height,width`,
// every other row is `id,x,y,orientation,length` with orientation H or V,
// rows starting with # are comments, rows with fewer than 5 fields are ignored.
// Vehicle ids are a single character; `AA` or `10` are rejected.
// Fields are separated by `;` if one appears anywhere, `,` otherwise.

pub fn load_puzzle(path: impl AsRef<Path>) -> Result<Board, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let board = parse_puzzle(&content)?;
    debug!(
        "loaded {}: {}x{} with {} vehicles",
        path.display(),
        board.height(),
        board.width(),
        board.vehicles().len()
    );
    Ok(board)
}

pub fn parse_puzzle(content: &str) -> Result<Board, LoadError> {
    let delimiter = if content.contains(';') { ';' } else { ',' };

    let mut rows = content
        .lines()
        .enumerate()
        .map(|(ix, line)| {
            let fields = line
                .split(delimiter)
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect_vec();
            (ix + 1, fields)
        })
        .filter(|(_, fields)| !fields.is_empty());

    let (line, header) = rows.next().ok_or(LoadError::Empty)?;
    let height = number(line, header[0])?;
    let width = number(line, header.get(1).copied().unwrap_or_default())?;

    let mut vehicles = Vec::new();
    for (line, fields) in rows {
        if fields[0].starts_with('#') || fields.len() < 5 {
            continue;
        }

        vehicles.push(Vehicle::new(
            vehicle_id(line, fields[0])?,
            number(line, fields[1])?,
            number(line, fields[2])?,
            orientation(line, fields[3])?,
            number(line, fields[4])?,
        ));
    }

    Ok(Board::new(height, width, vehicles)?)
}

fn number(line: usize, value: &str) -> Result<usize, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidNumber {
        line,
        value: value.to_owned(),
    })
}

fn vehicle_id(line: usize, value: &str) -> Result<VehicleId, LoadError> {
    value
        .chars()
        .exactly_one()
        .map_err(|_| LoadError::InvalidId {
            line,
            value: value.to_owned(),
        })
}

fn orientation(line: usize, value: &str) -> Result<Orientation, LoadError> {
    match value {
        "H" | "h" => Ok(Orientation::Horizontal),
        "V" | "v" => Ok(Orientation::Vertical),
        _ => Err(LoadError::InvalidOrientation {
            line,
            value: value.to_owned(),
        }),
    }
}
