//! Terrain features carried by hexes.
//!
//! A hex holds at most one `Terrain` per `TerrainKind`. Each terrain has a
//! level (depth, density, structure type, ...) and a six-bit exit mask naming
//! the directions in which the feature continues into the neighboring hex.
//!
//! Text form: `name:level[:exits]`, several entries joined by `;`. An entry
//! that carries an explicit exit mask keeps it; otherwise the board derives
//! exits from the neighbors.

use serde::{Deserialize, Serialize};

use super::coords::Facing;

/// Errors from parsing terrain text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TerrainParseError {
    #[error("unknown terrain name: '{0}'")]
    UnknownTerrain(String),

    #[error("invalid terrain level in '{0}'")]
    InvalidLevel(String),

    #[error("invalid terrain exits in '{0}'")]
    InvalidExits(String),

    #[error("empty terrain entry")]
    Empty,
}

/// Every terrain feature a hex can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Woods,
    Water,
    Rough,
    Rubble,
    Jungle,
    Sand,
    Tundra,
    Magma,
    PlantedFields,
    Industrial,
    Space,
    Pavement,
    Road,
    Swamp,
    Mud,
    Rapids,
    Ice,
    BlackIce,
    Snow,
    Fire,
    Smoke,
    Geyser,
    Impassable,
    Fortified,
    Screen,
    FoliageElev,
    HazardousLiquid,
    Sky,
    Building,
    BldgCf,
    BldgElev,
    BldgClass,
    BldgArmor,
    BldgBasementType,
    BldgBaseCollapsed,
    Bridge,
    BridgeCf,
    BridgeElev,
    FuelTank,
    FuelTankCf,
    FuelTankElev,
    FuelTankMagn,
    DeploymentZone,
    CliffTop,
    CliffBottom,
    InclineTop,
    InclineBottom,
    InclineHighTop,
    InclineHighBottom,
}

/// Name table in declaration order.
const NAMES: &[(TerrainKind, &str)] = &[
    (TerrainKind::Woods, "woods"),
    (TerrainKind::Water, "water"),
    (TerrainKind::Rough, "rough"),
    (TerrainKind::Rubble, "rubble"),
    (TerrainKind::Jungle, "jungle"),
    (TerrainKind::Sand, "sand"),
    (TerrainKind::Tundra, "tundra"),
    (TerrainKind::Magma, "magma"),
    (TerrainKind::PlantedFields, "planted_fields"),
    (TerrainKind::Industrial, "industrial"),
    (TerrainKind::Space, "space"),
    (TerrainKind::Pavement, "pavement"),
    (TerrainKind::Road, "road"),
    (TerrainKind::Swamp, "swamp"),
    (TerrainKind::Mud, "mud"),
    (TerrainKind::Rapids, "rapids"),
    (TerrainKind::Ice, "ice"),
    (TerrainKind::BlackIce, "black_ice"),
    (TerrainKind::Snow, "snow"),
    (TerrainKind::Fire, "fire"),
    (TerrainKind::Smoke, "smoke"),
    (TerrainKind::Geyser, "geyser"),
    (TerrainKind::Impassable, "impassable"),
    (TerrainKind::Fortified, "fortified"),
    (TerrainKind::Screen, "screen"),
    (TerrainKind::FoliageElev, "foliage_elev"),
    (TerrainKind::HazardousLiquid, "hazardous_liquid"),
    (TerrainKind::Sky, "sky"),
    (TerrainKind::Building, "building"),
    (TerrainKind::BldgCf, "bldg_cf"),
    (TerrainKind::BldgElev, "bldg_elev"),
    (TerrainKind::BldgClass, "bldg_class"),
    (TerrainKind::BldgArmor, "bldg_armor"),
    (TerrainKind::BldgBasementType, "bldg_basement_type"),
    (TerrainKind::BldgBaseCollapsed, "bldg_base_collapsed"),
    (TerrainKind::Bridge, "bridge"),
    (TerrainKind::BridgeCf, "bridge_cf"),
    (TerrainKind::BridgeElev, "bridge_elev"),
    (TerrainKind::FuelTank, "fuel_tank"),
    (TerrainKind::FuelTankCf, "fuel_tank_cf"),
    (TerrainKind::FuelTankElev, "fuel_tank_elev"),
    (TerrainKind::FuelTankMagn, "fuel_tank_magn"),
    (TerrainKind::DeploymentZone, "deployment_zone"),
    (TerrainKind::CliffTop, "cliff_top"),
    (TerrainKind::CliffBottom, "cliff_bottom"),
    (TerrainKind::InclineTop, "incline_top"),
    (TerrainKind::InclineBottom, "incline_bottom"),
    (TerrainKind::InclineHighTop, "incline_high_top"),
    (TerrainKind::InclineHighBottom, "incline_high_bottom"),
];

/// Terrain the board computes from elevation differences; never saved.
pub const AUTOMATIC_TERRAIN: [TerrainKind; 5] = [
    TerrainKind::CliffBottom,
    TerrainKind::InclineTop,
    TerrainKind::InclineBottom,
    TerrainKind::InclineHighTop,
    TerrainKind::InclineHighBottom,
];

impl TerrainKind {
    /// The lowercase name used in board files.
    pub fn name(self) -> &'static str {
        NAMES[self as usize].1
    }

    /// Looks up a terrain kind by name, ignoring case.
    pub fn from_name(name: &str) -> Option<TerrainKind> {
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(k, _)| *k)
    }

    /// True for terrain derived by the board rather than authored.
    pub fn is_automatic(self) -> bool {
        AUTOMATIC_TERRAIN.contains(&self)
    }

    /// True for terrain whose exits the board derives from matching neighbors.
    pub const fn auto_connects(self) -> bool {
        matches!(
            self,
            TerrainKind::Road
                | TerrainKind::Pavement
                | TerrainKind::Water
                | TerrainKind::Building
                | TerrainKind::Bridge
                | TerrainKind::FuelTank
        )
    }

    /// True when connecting exits also require equal levels.
    const fn exits_need_equal_level(self) -> bool {
        matches!(
            self,
            TerrainKind::Building | TerrainKind::Bridge | TerrainKind::FuelTank
        )
    }
}

impl std::fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One terrain feature on a hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terrain {
    kind: TerrainKind,
    level: i32,
    exits: u32,
    exits_specified: bool,
}

impl Terrain {
    /// A terrain whose exits the board will derive.
    pub fn new(kind: TerrainKind, level: i32) -> Self {
        Terrain {
            kind,
            level,
            exits: 0,
            exits_specified: false,
        }
    }

    /// A terrain with an authored exit mask.
    pub fn with_exits(kind: TerrainKind, level: i32, exits: u32) -> Self {
        Terrain {
            kind,
            level,
            exits,
            exits_specified: true,
        }
    }

    /// Parses a single `name:level[:exits]` entry.
    pub fn parse(entry: &str) -> Result<Terrain, TerrainParseError> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(TerrainParseError::Empty);
        }
        let mut parts = entry.split(':');
        let name = parts.next().unwrap_or_default();
        let kind = TerrainKind::from_name(name)
            .ok_or_else(|| TerrainParseError::UnknownTerrain(name.to_string()))?;

        let level = match parts.next() {
            Some(l) => l
                .trim()
                .parse::<i32>()
                .map_err(|_| TerrainParseError::InvalidLevel(entry.to_string()))?,
            None => 0,
        };

        match parts.next() {
            Some(e) => {
                let exits = e
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| TerrainParseError::InvalidExits(entry.to_string()))?;
                if parts.next().is_some() {
                    return Err(TerrainParseError::InvalidExits(entry.to_string()));
                }
                Ok(Terrain::with_exits(kind, level, exits))
            }
            None => Ok(Terrain::new(kind, level)),
        }
    }

    pub fn kind(&self) -> TerrainKind {
        self.kind
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    /// The raw exit mask. Deployment-zone markers reuse it as a zone-id bit set.
    pub fn exits(&self) -> u32 {
        self.exits
    }

    pub fn exits_specified(&self) -> bool {
        self.exits_specified
    }

    pub fn has_exit(&self, dir: Facing) -> bool {
        self.exits & dir.bit() != 0
    }

    /// Sets or clears one derived exit bit.
    pub fn set_exit(&mut self, dir: Facing, open: bool) {
        if open {
            self.exits |= dir.bit();
        } else {
            self.exits &= !dir.bit();
        }
    }

    /// Clears derived exits; authored masks are kept.
    pub fn clear_exits(&mut self) {
        if !self.exits_specified {
            self.exits = 0;
        }
    }

    /// Whether this terrain continues into a neighbor carrying `other`.
    pub fn exits_to(&self, other: Option<&Terrain>) -> bool {
        match other {
            Some(o) if o.kind == self.kind => {
                !self.kind.exits_need_equal_level() || o.level == self.level
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.level)?;
        if self.exits_specified {
            write!(f, ":{}", self.exits)?;
        }
        Ok(())
    }
}

/// Splits a `;`-separated terrain list, returning the parsed entries and the
/// errors of any entries that were skipped.
pub fn parse_terrain_list(spec: &str) -> (Vec<Terrain>, Vec<TerrainParseError>) {
    let mut terrains = Vec::new();
    let mut errors = Vec::new();
    for entry in spec.split(';').filter(|e| !e.trim().is_empty()) {
        match Terrain::parse(entry) {
            Ok(t) => terrains.push(t),
            Err(e) => errors.push(e),
        }
    }
    (terrains, errors)
}
