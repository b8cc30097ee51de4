//! Grid Coordinates
//!
//! Integer tile coordinates and rectangular bounds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use fauna_events::CellRef;

/// A tile on the simulation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const ZERO: GridPosition = GridPosition { x: 0, y: 0 };
    pub const UP: GridPosition = GridPosition { x: 0, y: 1 };
    pub const DOWN: GridPosition = GridPosition { x: 0, y: -1 };
    pub const LEFT: GridPosition = GridPosition { x: -1, y: 0 };
    pub const RIGHT: GridPosition = GridPosition { x: 1, y: 0 };

    /// The four cardinal steps, in the order neighbors are enumerated.
    pub const CARDINALS: [GridPosition; 4] = [
        GridPosition::UP,
        GridPosition::DOWN,
        GridPosition::LEFT,
        GridPosition::RIGHT,
    ];

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// |dx| + |dy|
    pub fn manhattan_distance(&self, other: &GridPosition) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn neighbors(&self) -> [GridPosition; 4] {
        Self::CARDINALS.map(|step| *self + step)
    }

    /// Cells at exactly `distance` Manhattan steps, walked clockwise from
    /// the cell straight above. Order is stable for a given distance.
    pub fn ring(&self, distance: i32) -> Vec<GridPosition> {
        if distance <= 0 {
            return vec![*self];
        }
        let mut cells = Vec::with_capacity((distance * 4) as usize);
        // top -> right -> bottom -> left
        for i in 0..distance {
            cells.push(GridPosition::new(self.x + i, self.y + distance - i));
        }
        for i in 0..distance {
            cells.push(GridPosition::new(self.x + distance - i, self.y - i));
        }
        for i in 0..distance {
            cells.push(GridPosition::new(self.x - i, self.y - distance + i));
        }
        for i in 0..distance {
            cells.push(GridPosition::new(self.x - distance + i, self.y + i));
        }
        cells
    }

    pub fn to_cell_ref(self) -> CellRef {
        CellRef::new(self.x, self.y)
    }
}

impl Add for GridPosition {
    type Output = GridPosition;

    fn add(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridPosition {
    type Output = GridPosition;

    fn sub(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<GridPosition> for CellRef {
    fn from(cell: GridPosition) -> Self {
        cell.to_cell_ref()
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min: GridPosition,
    pub max: GridPosition,
}

impl GridBounds {
    pub fn new(min: GridPosition, max: GridPosition) -> Self {
        Self { min, max }
    }

    /// Bounds covering a `width` x `height` grid anchored at the origin.
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(GridPosition::ZERO, GridPosition::new(width - 1, height - 1))
    }

    pub fn contains(&self, cell: GridPosition) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    pub fn center(&self) -> GridPosition {
        GridPosition::new(
            self.min.x + (self.max.x - self.min.x) / 2,
            self.min.y + (self.max.y - self.min.y) / 2,
        )
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }
}
