//! Offset hex coordinates and facings.
//!
//! The board uses flat-topped hexes arranged in columns; odd columns are
//! shifted half a hex down. `Coords` are zero-based column/row pairs and the
//! six `Facing` values name the directions to the neighboring hexes,
//! clockwise from north.

use serde::{Deserialize, Serialize};

use super::cube::CubeCoords;

/// One of the six hex-side directions, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    North = 0,
    NorthEast = 1,
    SouthEast = 2,
    South = 3,
    SouthWest = 4,
    NorthWest = 5,
}

impl Facing {
    /// All facings in index order.
    pub const ALL: [Facing; 6] = [
        Facing::North,
        Facing::NorthEast,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::NorthWest,
    ];

    /// Returns the facing for an index, wrapping modulo 6.
    pub const fn from_index(index: i32) -> Facing {
        Facing::ALL[index.rem_euclid(6) as usize]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The exit bit for this facing in a terrain connectivity mask.
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub const fn opposite(self) -> Facing {
        Facing::from_index(self as i32 + 3)
    }

    /// Rotates clockwise by `steps` hex sides (negative rotates counter-clockwise).
    pub const fn rotated(self, steps: i32) -> Facing {
        Facing::from_index(self as i32 + steps)
    }

    /// Compass bearing of this facing in degrees.
    pub const fn compass_degrees(self) -> u16 {
        (self as u16) * 60
    }

    /// Short compass label used in logs and diagnostics.
    pub const fn abbr(self) -> &'static str {
        match self {
            Facing::North => "N",
            Facing::NorthEast => "NE",
            Facing::SouthEast => "SE",
            Facing::South => "S",
            Facing::SouthWest => "SW",
            Facing::NorthWest => "NW",
        }
    }
}

/// A zero-based column/row position on a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32) -> Self {
        Coords { x, y }
    }

    /// Returns the neighboring coordinate in the given direction.
    pub const fn translated(self, dir: Facing) -> Coords {
        let odd = self.x & 1;
        match dir {
            Facing::North => Coords::new(self.x, self.y - 1),
            Facing::NorthEast => Coords::new(self.x + 1, self.y - 1 + odd),
            Facing::SouthEast => Coords::new(self.x + 1, self.y + odd),
            Facing::South => Coords::new(self.x, self.y + 1),
            Facing::SouthWest => Coords::new(self.x - 1, self.y + odd),
            Facing::NorthWest => Coords::new(self.x - 1, self.y - 1 + odd),
        }
    }

    /// Steps `distance` hexes in a straight line.
    pub fn translated_by(self, dir: Facing, distance: u32) -> Coords {
        (0..distance).fold(self, |c, _| c.translated(dir))
    }

    /// All six neighbors in facing order.
    pub fn neighbors(self) -> [Coords; 6] {
        Facing::ALL.map(|dir| self.translated(dir))
    }

    pub fn to_cube(self) -> CubeCoords {
        let q = self.x;
        let r = self.y - (self.x - (self.x & 1)) / 2;
        CubeCoords::new(q as f64, r as f64, (-q - r) as f64)
    }

    /// Converts a cube coordinate to the offset coordinate of the hex it rounds into.
    pub fn from_cube(cube: CubeCoords) -> Coords {
        let rounded = cube.round();
        let q = rounded.q as i32;
        let r = rounded.r as i32;
        Coords::new(q, r + (q - (q & 1)) / 2)
    }

    /// Number of hex steps between two coordinates.
    pub fn distance(self, other: Coords) -> i32 {
        self.to_cube().distance(&other.to_cube())
    }

    /// Returns the facing leading to `other` when the two hexes are adjacent.
    pub fn direction_to(self, other: Coords) -> Option<Facing> {
        Facing::ALL.into_iter().find(|&dir| self.translated(dir) == other)
    }

    /// Every coordinate within `radius` steps, including this one.
    pub fn within_radius(self, radius: i32) -> Vec<Coords> {
        let center = self.to_cube();
        let mut result = Vec::new();
        for dq in -radius..=radius {
            let lo = (-radius).max(-dq - radius);
            let hi = radius.min(-dq + radius);
            for dr in lo..=hi {
                let offset = CubeCoords::new(dq as f64, dr as f64, (-dq - dr) as f64);
                result.push(Coords::from_cube(center + offset));
            }
        }
        result
    }

    /// The one-based hex number shown to players, e.g. `0304` for (2, 3).
    pub fn board_num(self, wide: bool) -> String {
        if wide {
            format!("{:03}{:03}", self.x + 1, self.y + 1)
        } else {
            format!("{:02}{:02}", self.x + 1, self.y + 1)
        }
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
