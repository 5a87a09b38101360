//! Board representation.
//!
//! Contains the hex-grid coordinate types, the hex cell and its terrain
//! encoding, structures standing on the board, deployment zones, and the
//! `Board` that ties them together.

pub mod auto_terrain;
pub mod building;
pub mod coords;
pub mod cube;
pub mod dimensions;
pub mod events;
pub mod hex;
pub mod markers;
pub mod state;
pub mod terrain;
pub mod zones;

pub use building::{
    BasementType, Building, BuildingClass, BuildingError, BuildingHex, BuildingType, StructureKind,
};
pub use coords::{Coords, Facing};
pub use cube::CubeCoords;
pub use dimensions::{
    BoardDimensions, BoardType, DimensionError, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_SIDE,
};
pub use events::{BoardEvent, BoardListener};
pub use hex::Hex;
pub use markers::{Inferno, InfernoKind, SpecialDisplayKind, SpecialHexDisplay};
pub use state::{Board, BoardLocation, BoardOptions};
pub use terrain::{Terrain, TerrainKind, TerrainParseError};
pub use zones::{DeploymentArea, HexArea, StartZone, CUSTOM_ZONE_OFFSET};
