//! Deployment zones.
//!
//! Built-in zones are compass bands measured from the board edges: each edge
//! band is `width` hexes deep, starting `offset` hexes in from its edge, and
//! a corner zone is the union of its two edge bands. Custom zones carry
//! their own numbers and are resolved to hex sets by the board, from
//! `deployment_zone` terrain markers and from registered `HexArea`s.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::coords::Coords;
use super::dimensions::BoardDimensions;
use super::state::Board;
use super::terrain::TerrainKind;

/// Zone ids at or above this value name custom zones; the built-in zones
/// and their reserved range sit below it.
pub const CUSTOM_ZONE_OFFSET: i32 = 22;

/// Where a side may set up at the start of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartZone {
    None,
    Any,
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    Edge,
    Center,
    Custom(u32),
}

impl StartZone {
    /// Numeric id, with custom zones shifted past the built-in range.
    pub fn id(self) -> i32 {
        match self {
            StartZone::None => -1,
            StartZone::Any => 0,
            StartZone::NorthWest => 1,
            StartZone::North => 2,
            StartZone::NorthEast => 3,
            StartZone::East => 4,
            StartZone::SouthEast => 5,
            StartZone::South => 6,
            StartZone::SouthWest => 7,
            StartZone::West => 8,
            StartZone::Edge => 9,
            StartZone::Center => 10,
            StartZone::Custom(n) => CUSTOM_ZONE_OFFSET.saturating_add_unsigned(n),
        }
    }

    /// Inverse of `id`; ids in the reserved range yield `None`.
    pub fn from_id(id: i32) -> Option<StartZone> {
        Some(match id {
            -1 => StartZone::None,
            0 => StartZone::Any,
            1 => StartZone::NorthWest,
            2 => StartZone::North,
            3 => StartZone::NorthEast,
            4 => StartZone::East,
            5 => StartZone::SouthEast,
            6 => StartZone::South,
            7 => StartZone::SouthWest,
            8 => StartZone::West,
            9 => StartZone::Edge,
            10 => StartZone::Center,
            n if n >= CUSTOM_ZONE_OFFSET => StartZone::Custom((n - CUSTOM_ZONE_OFFSET) as u32),
            _ => return None,
        })
    }
}

/// A zone together with the depth and offset of its bands and, for
/// `StartZone::Any`, an optional bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentArea {
    pub zone: StartZone,
    pub width: i32,
    pub offset: i32,
    /// Inclusive north-west corner of the `Any` box; each side is optional.
    pub nw_corner: Option<Coords>,
    /// Inclusive south-east corner of the `Any` box.
    pub se_corner: Option<Coords>,
}

impl DeploymentArea {
    pub const fn new(zone: StartZone, width: i32, offset: i32) -> Self {
        DeploymentArea {
            zone,
            width,
            offset,
            nw_corner: None,
            se_corner: None,
        }
    }

    pub const fn with_bounds(mut self, nw: Option<Coords>, se: Option<Coords>) -> Self {
        self.nw_corner = nw;
        self.se_corner = se;
        self
    }
}

struct Bands {
    width: i32,
    offset: i32,
    board_w: i32,
    board_h: i32,
}

impl Bands {
    fn north(&self, c: Coords) -> bool {
        c.y >= self.offset && c.y < self.offset + self.width
    }

    fn south(&self, c: Coords) -> bool {
        c.y >= self.board_h - self.offset - self.width && c.y < self.board_h - self.offset
    }

    fn west(&self, c: Coords) -> bool {
        c.x >= self.offset && c.x < self.offset + self.width
    }

    fn east(&self, c: Coords) -> bool {
        c.x >= self.board_w - self.offset - self.width && c.x < self.board_w - self.offset
    }
}

/// Evaluates a built-in zone. Returns `None` for custom zones, which need
/// the board's resolved zone sets.
pub fn in_builtin_zone(c: Coords, area: &DeploymentArea, dims: BoardDimensions) -> Option<bool> {
    let bands = Bands {
        width: area.width,
        offset: area.offset,
        board_w: dims.width(),
        board_h: dims.height(),
    };
    let inside = match area.zone {
        StartZone::None => false,
        StartZone::Any => {
            let nw_ok = area.nw_corner.map_or(true, |nw| c.x >= nw.x && c.y >= nw.y);
            let se_ok = area.se_corner.map_or(true, |se| c.x <= se.x && c.y <= se.y);
            nw_ok && se_ok
        }
        StartZone::NorthWest => bands.north(c) || bands.west(c),
        StartZone::North => bands.north(c),
        StartZone::NorthEast => bands.north(c) || bands.east(c),
        StartZone::East => bands.east(c),
        StartZone::SouthEast => bands.south(c) || bands.east(c),
        StartZone::South => bands.south(c),
        StartZone::SouthWest => bands.south(c) || bands.west(c),
        StartZone::West => bands.west(c),
        StartZone::Edge => bands.north(c) || bands.south(c) || bands.east(c) || bands.west(c),
        StartZone::Center => {
            let (w, h) = (dims.width(), dims.height());
            c.x >= w / 3 && c.x <= 2 * w / 3 && c.y >= h / 3 && c.y <= 2 * h / 3
        }
        StartZone::Custom(_) => return None,
    };
    Some(inside)
}

/// A declarative hex set, resolved against a board on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum HexArea {
    Empty,
    All,
    /// Inclusive rectangle of columns `x1..=x2` and rows `y1..=y2`.
    Rectangle { x1: i32, y1: i32, x2: i32, y2: i32 },
    Circle { center: Coords, radius: i32 },
    /// Hexes whose distance to any selected edge lies in `min..=max`.
    Border {
        #[serde(default)]
        north: bool,
        #[serde(default)]
        south: bool,
        #[serde(default)]
        east: bool,
        #[serde(default)]
        west: bool,
        #[serde(default)]
        min_distance: i32,
        #[serde(default)]
        max_distance: i32,
    },
    /// Hexes carrying a terrain, optionally within a level range.
    Terrain {
        terrain: TerrainKind,
        #[serde(default)]
        min_level: Option<i32>,
        #[serde(default)]
        max_level: Option<i32>,
    },
    Hexes { hexes: Vec<Coords> },
    Union { areas: Vec<HexArea> },
    Intersection { areas: Vec<HexArea> },
    Difference { base: Box<HexArea>, minus: Box<HexArea> },
}

impl HexArea {
    /// Parses an area from its JSON form, e.g. `{"shape":"circle","center":{"x":3,"y":4},"radius":2}`.
    pub fn from_json(json: &str) -> Result<HexArea, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True if the on-board coordinate `c` belongs to this area.
    pub fn contains(&self, c: Coords, board: &Board) -> bool {
        if !board.contains(c) {
            return false;
        }
        match self {
            HexArea::Empty => false,
            HexArea::All => true,
            HexArea::Rectangle { x1, y1, x2, y2 } => {
                c.x >= *x1.min(x2) && c.x <= *x1.max(x2) && c.y >= *y1.min(y2) && c.y <= *y1.max(y2)
            }
            HexArea::Circle { center, radius } => center.distance(c) <= *radius,
            HexArea::Border {
                north,
                south,
                east,
                west,
                min_distance,
                max_distance,
            } => {
                let dims = board.dimensions();
                let in_band = |d: i32| d >= *min_distance && d <= *max_distance;
                (*north && in_band(c.y))
                    || (*south && in_band(dims.height() - 1 - c.y))
                    || (*west && in_band(c.x))
                    || (*east && in_band(dims.width() - 1 - c.x))
            }
            HexArea::Terrain {
                terrain,
                min_level,
                max_level,
            } => board
                .hex(c)
                .and_then(|h| h.terrain_level(*terrain))
                .is_some_and(|level| {
                    min_level.map_or(true, |m| level >= m) && max_level.map_or(true, |m| level <= m)
                }),
            HexArea::Hexes { hexes } => hexes.contains(&c),
            HexArea::Union { areas } => areas.iter().any(|a| a.contains(c, board)),
            HexArea::Intersection { areas } => {
                !areas.is_empty() && areas.iter().all(|a| a.contains(c, board))
            }
            HexArea::Difference { base, minus } => {
                base.contains(c, board) && !minus.contains(c, board)
            }
        }
    }

    /// Every board coordinate in the area.
    pub fn resolve(&self, board: &Board) -> HashSet<Coords> {
        board
            .dimensions()
            .all_coords()
            .filter(|c| self.contains(*c, board))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: i32, h: i32) -> BoardDimensions {
        BoardDimensions::new(w, h).unwrap()
    }

    fn inside(c: Coords, zone: StartZone, width: i32, offset: i32, d: BoardDimensions) -> bool {
        in_builtin_zone(c, &DeploymentArea::new(zone, width, offset), d).unwrap()
    }

    #[test]
    fn north_band_on_standard_sheet() {
        let d = dims(16, 17);
        for x in 0..16 {
            for y in 0..3 {
                assert!(inside(Coords::new(x, y), StartZone::North, 3, 0, d));
            }
            assert!(!inside(Coords::new(x, 3), StartZone::North, 3, 0, d));
        }
    }

    #[test]
    fn offset_moves_band_inward() {
        let d = dims(16, 17);
        assert!(!inside(Coords::new(4, 1), StartZone::North, 3, 2, d));
        assert!(inside(Coords::new(4, 2), StartZone::North, 3, 2, d));
        assert!(inside(Coords::new(4, 4), StartZone::North, 3, 2, d));
        assert!(!inside(Coords::new(4, 5), StartZone::North, 3, 2, d));

        assert!(inside(Coords::new(4, 14), StartZone::South, 3, 0, d));
        assert!(!inside(Coords::new(4, 13), StartZone::South, 3, 0, d));
        assert!(!inside(Coords::new(12, 16), StartZone::South, 3, 1, d));
        assert!(inside(Coords::new(12, 15), StartZone::South, 3, 1, d));
    }

    #[test]
    fn corners_are_unions_of_edges() {
        let d = dims(16, 17);
        let ne = |x, y| inside(Coords::new(x, y), StartZone::NorthEast, 2, 0, d);
        assert!(ne(0, 0));
        assert!(ne(14, 10));
        assert!(ne(15, 16));
        assert!(!ne(13, 10));
        let sw = |x, y| inside(Coords::new(x, y), StartZone::SouthWest, 2, 0, d);
        assert!(sw(1, 0));
        assert!(sw(10, 15));
        assert!(!sw(10, 14));
    }

    #[test]
    fn edge_and_center() {
        let d = dims(16, 17);
        assert!(inside(Coords::new(15, 8), StartZone::Edge, 1, 0, d));
        assert!(!inside(Coords::new(14, 8), StartZone::Edge, 1, 0, d));
        assert!(inside(Coords::new(8, 8), StartZone::Center, 0, 0, d));
        assert!(inside(Coords::new(5, 5), StartZone::Center, 0, 0, d));
        assert!(!inside(Coords::new(4, 8), StartZone::Center, 0, 0, d));
        assert!(inside(Coords::new(10, 11), StartZone::Center, 0, 0, d));
        assert!(!inside(Coords::new(11, 8), StartZone::Center, 0, 0, d));
    }

    #[test]
    fn any_with_bounding_box() {
        let d = dims(16, 17);
        let open = DeploymentArea::new(StartZone::Any, 3, 0);
        assert_eq!(in_builtin_zone(Coords::new(9, 9), &open, d), Some(true));
        let boxed = open.with_bounds(Some(Coords::new(2, 2)), Some(Coords::new(5, 6)));
        assert_eq!(in_builtin_zone(Coords::new(2, 6), &boxed, d), Some(true));
        assert_eq!(in_builtin_zone(Coords::new(1, 3), &boxed, d), Some(false));
        assert_eq!(in_builtin_zone(Coords::new(3, 7), &boxed, d), Some(false));
        let half = open.with_bounds(None, Some(Coords::new(5, 6)));
        assert_eq!(in_builtin_zone(Coords::new(0, 0), &half, d), Some(true));
    }

    #[test]
    fn none_and_custom() {
        let d = dims(4, 4);
        assert_eq!(
            in_builtin_zone(Coords::new(0, 0), &DeploymentArea::new(StartZone::None, 3, 0), d),
            Some(false)
        );
        assert_eq!(
            in_builtin_zone(Coords::new(0, 0), &DeploymentArea::new(StartZone::Custom(1), 3, 0), d),
            None
        );
    }

    #[test]
    fn zone_ids_round_trip() {
        for id in -1..=10 {
            assert_eq!(StartZone::from_id(id).unwrap().id(), id);
        }
        assert_eq!(StartZone::from_id(11), None);
        assert_eq!(StartZone::from_id(21), None);
        assert_eq!(StartZone::from_id(22), Some(StartZone::Custom(0)));
        assert_eq!(StartZone::Custom(5).id(), 27);
    }

    #[test]
    fn area_json_forms() {
        let area = HexArea::from_json(
            r#"{"shape":"union","areas":[
                {"shape":"circle","center":{"x":3,"y":4},"radius":1},
                {"shape":"border","north":true,"max_distance":0}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(area, HexArea::Union { ref areas } if areas.len() == 2));
        assert!(HexArea::from_json(r#"{"shape":"hexagon"}"#).is_err());
        let terrain = HexArea::from_json(r#"{"shape":"terrain","terrain":"woods","min_level":2}"#)
            .unwrap();
        assert_eq!(
            terrain,
            HexArea::Terrain {
                terrain: TerrainKind::Woods,
                min_level: Some(2),
                max_level: None
            }
        );
    }
}
