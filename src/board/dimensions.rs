//! Board size and board category.

use serde::{Deserialize, Serialize};

use super::coords::Coords;

/// Width of a standard map sheet.
pub const DEFAULT_WIDTH: i32 = 16;

/// Height of a standard map sheet.
pub const DEFAULT_HEIGHT: i32 = 17;

/// Longest side a board may have; hex numbers carry at most three digits per axis.
pub const MAX_SIDE: i32 = 999;

/// Errors from constructing board dimensions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("board width must be between 1 and 999, got {0}")]
    InvalidWidth(i32),

    #[error("board height must be between 1 and 999, got {0}")]
    InvalidHeight(i32),
}

/// A validated width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions", into = "RawDimensions")]
pub struct BoardDimensions {
    width: i32,
    height: i32,
}

#[derive(Serialize, Deserialize)]
struct RawDimensions {
    width: i32,
    height: i32,
}

impl TryFrom<RawDimensions> for BoardDimensions {
    type Error = DimensionError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        BoardDimensions::new(raw.width, raw.height)
    }
}

impl From<BoardDimensions> for RawDimensions {
    fn from(dims: BoardDimensions) -> Self {
        RawDimensions {
            width: dims.width,
            height: dims.height,
        }
    }
}

impl BoardDimensions {
    pub fn new(width: i32, height: i32) -> Result<Self, DimensionError> {
        if !(1..=MAX_SIDE).contains(&width) {
            return Err(DimensionError::InvalidWidth(width));
        }
        if !(1..=MAX_SIDE).contains(&height) {
            return Err(DimensionError::InvalidHeight(height));
        }
        Ok(BoardDimensions { width, height })
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Number of hexes on the board.
    pub const fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub const fn contains(&self, c: Coords) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    /// Row-major index of a coordinate, if it lies on the board.
    pub const fn index_of(&self, c: Coords) -> Option<usize> {
        if self.contains(c) {
            Some((c.y as usize) * (self.width as usize) + c.x as usize)
        } else {
            None
        }
    }

    /// Coordinate at a row-major index. The index must be below `area()`.
    pub const fn coords_of(&self, index: usize) -> Coords {
        Coords::new(
            (index % self.width as usize) as i32,
            (index / self.width as usize) as i32,
        )
    }

    /// True when hex numbers need three digits per axis.
    pub const fn is_wide(&self) -> bool {
        self.width > 99 || self.height > 99
    }

    /// All coordinates in row-major order.
    pub fn all_coords(&self) -> impl Iterator<Item = Coords> + '_ {
        (0..self.area()).map(move |i| self.coords_of(i))
    }
}

impl Default for BoardDimensions {
    fn default() -> Self {
        BoardDimensions {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl std::fmt::Display for BoardDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The kind of map a board represents; gates which geometry rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoardType {
    /// A ground map.
    #[default]
    Ground,
    /// A low-altitude map showing the terrain below.
    SkyWithTerrain,
    /// A low-altitude map with open sky only.
    Sky,
    /// The transition band between atmosphere and space.
    NearSpace,
    /// Deep space.
    Space,
    /// An abstract radar map.
    Radar,
}

impl BoardType {
    pub const fn on_ground(self) -> bool {
        matches!(self, BoardType::Ground)
    }

    pub const fn is_low_altitude(self) -> bool {
        matches!(self, BoardType::SkyWithTerrain | BoardType::Sky)
    }

    pub const fn in_atmosphere(self) -> bool {
        self.is_low_altitude()
    }

    pub const fn in_space(self) -> bool {
        matches!(self, BoardType::NearSpace | BoardType::Space)
    }

    pub const fn is_deep_space(self) -> bool {
        matches!(self, BoardType::Space)
    }
}
