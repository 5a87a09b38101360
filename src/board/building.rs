//! Buildings, bridges and fuel tanks standing on the board.
//!
//! A structure spans every hex reachable from its first hex by following the
//! structure terrain's exits. The board constructs structures while it scans
//! its hexes; afterwards each `Building` owns its own per-hex state
//! (construction factor, armor, height, basement).

use std::collections::{BTreeMap, VecDeque};

use super::coords::{Coords, Facing};
use super::hex::Hex;
use super::terrain::TerrainKind;

/// Errors raised while constructing a structure from board terrain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildingError {
    #[error("no {structure} terrain at {coords}")]
    MissingTerrain { structure: StructureKind, coords: Coords },

    #[error("invalid building type {level} at {coords}")]
    InvalidType { level: i32, coords: Coords },

    #[error("invalid building class {level} at {coords}")]
    InvalidClass { level: i32, coords: Coords },

    #[error("{structure} at {from} has an exit toward {to} into a different type or class")]
    MismatchedNeighbor {
        structure: StructureKind,
        from: Coords,
        to: Coords,
    },
}

/// The three kinds of structure a hex can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructureKind {
    Building,
    Bridge,
    FuelTank,
}

impl StructureKind {
    pub const ALL: [StructureKind; 3] = [
        StructureKind::Building,
        StructureKind::Bridge,
        StructureKind::FuelTank,
    ];

    /// The terrain marking this structure; its level is the building type.
    pub const fn terrain(self) -> TerrainKind {
        match self {
            StructureKind::Building => TerrainKind::Building,
            StructureKind::Bridge => TerrainKind::Bridge,
            StructureKind::FuelTank => TerrainKind::FuelTank,
        }
    }

    pub const fn cf_terrain(self) -> TerrainKind {
        match self {
            StructureKind::Building => TerrainKind::BldgCf,
            StructureKind::Bridge => TerrainKind::BridgeCf,
            StructureKind::FuelTank => TerrainKind::FuelTankCf,
        }
    }

    pub const fn elevation_terrain(self) -> TerrainKind {
        match self {
            StructureKind::Building => TerrainKind::BldgElev,
            StructureKind::Bridge => TerrainKind::BridgeElev,
            StructureKind::FuelTank => TerrainKind::FuelTankElev,
        }
    }

    /// Every terrain kind that belongs to this structure.
    pub const fn family(self) -> &'static [TerrainKind] {
        match self {
            StructureKind::Building => &[
                TerrainKind::Building,
                TerrainKind::BldgCf,
                TerrainKind::BldgElev,
                TerrainKind::BldgClass,
                TerrainKind::BldgArmor,
                TerrainKind::BldgBasementType,
                TerrainKind::BldgBaseCollapsed,
            ],
            StructureKind::Bridge => &[
                TerrainKind::Bridge,
                TerrainKind::BridgeCf,
                TerrainKind::BridgeElev,
            ],
            StructureKind::FuelTank => &[
                TerrainKind::FuelTank,
                TerrainKind::FuelTankCf,
                TerrainKind::FuelTankElev,
                TerrainKind::FuelTankMagn,
            ],
        }
    }

    /// Strips this structure's terrain from a hex.
    pub fn strip_from(self, hex: &mut Hex) {
        for kind in self.family() {
            hex.remove_terrain(*kind);
        }
    }
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StructureKind::Building => "building",
            StructureKind::Bridge => "bridge",
            StructureKind::FuelTank => "fuel tank",
        })
    }
}

/// Structural type, stored as the level of the structure terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildingType {
    Light = 1,
    Medium = 2,
    Heavy = 3,
    Hardened = 4,
    Wall = 5,
}

impl BuildingType {
    pub const fn from_level(level: i32) -> Option<BuildingType> {
        match level {
            1 => Some(BuildingType::Light),
            2 => Some(BuildingType::Medium),
            3 => Some(BuildingType::Heavy),
            4 => Some(BuildingType::Hardened),
            5 => Some(BuildingType::Wall),
            _ => None,
        }
    }

    pub const fn level(self) -> i32 {
        self as i32
    }

    /// Construction factor used when a hex does not specify one.
    pub const fn default_cf(self) -> i32 {
        match self {
            BuildingType::Light => 15,
            BuildingType::Medium => 40,
            BuildingType::Heavy => 90,
            BuildingType::Hardened | BuildingType::Wall => 120,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BuildingType::Light => "Light",
            BuildingType::Medium => "Medium",
            BuildingType::Heavy => "Heavy",
            BuildingType::Hardened => "Hardened",
            BuildingType::Wall => "Wall",
        }
    }
}

/// Building class, stored as the level of `bldg_class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildingClass {
    #[default]
    Standard = 0,
    Hangar = 1,
    Fortress = 2,
    GunEmplacement = 3,
}

impl BuildingClass {
    pub const fn from_level(level: i32) -> Option<BuildingClass> {
        match level {
            0 => Some(BuildingClass::Standard),
            1 => Some(BuildingClass::Hangar),
            2 => Some(BuildingClass::Fortress),
            3 => Some(BuildingClass::GunEmplacement),
            _ => None,
        }
    }
}

/// What lies below a building hex, stored as the level of `bldg_basement_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BasementType {
    /// Not yet determined; resolved the first time something falls in.
    #[default]
    Unknown = 0,
    None = 1,
    OneDeepNormal = 2,
    OneDeepHeavy = 3,
    TwoDeepNormal = 4,
    TwoDeepHeavy = 5,
}

impl BasementType {
    pub const fn from_level(level: i32) -> Option<BasementType> {
        match level {
            0 => Some(BasementType::Unknown),
            1 => Some(BasementType::None),
            2 => Some(BasementType::OneDeepNormal),
            3 => Some(BasementType::OneDeepHeavy),
            4 => Some(BasementType::TwoDeepNormal),
            5 => Some(BasementType::TwoDeepHeavy),
            _ => None,
        }
    }

    /// Levels below the ground floor.
    pub const fn depth(self) -> i32 {
        match self {
            BasementType::Unknown | BasementType::None => 0,
            BasementType::OneDeepNormal | BasementType::OneDeepHeavy => 1,
            BasementType::TwoDeepNormal | BasementType::TwoDeepHeavy => 2,
        }
    }
}

/// Per-hex state of a structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingHex {
    pub height: i32,
    pub current_cf: i32,
    pub phase_cf: i32,
    pub armor: i32,
    pub basement: BasementType,
    pub basement_collapsed: bool,
}

/// A building, bridge or fuel tank spanning one or more hexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    id: u32,
    structure: StructureKind,
    building_type: BuildingType,
    class: BuildingClass,
    name: String,
    hexes: BTreeMap<Coords, BuildingHex>,
}

impl Building {
    /// Builds the structure containing `start` by following exits across the
    /// hexes returned by `lookup`.
    pub fn from_board<'a>(
        id: u32,
        start: Coords,
        structure: StructureKind,
        lookup: impl Fn(Coords) -> Option<&'a Hex>,
    ) -> Result<Building, BuildingError> {
        let terrain = structure.terrain();
        let first = lookup(start)
            .filter(|h| h.contains_terrain(terrain))
            .ok_or(BuildingError::MissingTerrain {
                structure,
                coords: start,
            })?;
        let level = first.terrain_level(terrain).unwrap_or(0);
        let building_type = BuildingType::from_level(level).ok_or(BuildingError::InvalidType {
            level,
            coords: start,
        })?;
        let class_level = first.terrain_level(TerrainKind::BldgClass).unwrap_or(0);
        let class = BuildingClass::from_level(class_level).ok_or(BuildingError::InvalidClass {
            level: class_level,
            coords: start,
        })?;

        let mut hexes = BTreeMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(c) = queue.pop_front() {
            if hexes.contains_key(&c) {
                continue;
            }
            let Some(hex) = lookup(c) else { continue };
            hexes.insert(c, BuildingHex::from_hex(hex, structure, building_type));

            for dir in Facing::ALL {
                if !hex.contains_exit(terrain, dir) {
                    continue;
                }
                let next = c.translated(dir);
                let Some(other) = lookup(next).filter(|h| h.contains_terrain(terrain)) else {
                    continue;
                };
                let same_type = other.terrain_level(terrain) == Some(level);
                let same_class =
                    other.terrain_level(TerrainKind::BldgClass).unwrap_or(0) == class_level;
                if !same_type || !same_class {
                    return Err(BuildingError::MismatchedNeighbor {
                        structure,
                        from: c,
                        to: next,
                    });
                }
                queue.push_back(next);
            }
        }

        let name = match structure {
            StructureKind::Building => format!("{} Building #{}", building_type.name(), id),
            StructureKind::Bridge => format!("{} Bridge #{}", building_type.name(), id),
            StructureKind::FuelTank => format!("{} Fuel Tank #{}", building_type.name(), id),
        };

        Ok(Building {
            id,
            structure,
            building_type,
            class,
            name,
            hexes,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn structure(&self) -> StructureKind {
        self.structure
    }

    pub fn building_type(&self) -> BuildingType {
        self.building_type
    }

    pub fn class(&self) -> BuildingClass {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coords(&self) -> impl Iterator<Item = Coords> + '_ {
        self.hexes.keys().copied()
    }

    pub fn contains(&self, c: Coords) -> bool {
        self.hexes.contains_key(&c)
    }

    pub fn hex_state(&self, c: Coords) -> Option<&BuildingHex> {
        self.hexes.get(&c)
    }

    /// Height above the hex level at `c`: floors for buildings, span for bridges.
    pub fn height(&self, c: Coords) -> Option<i32> {
        self.hexes.get(&c).map(|h| h.height)
    }

    pub fn current_cf(&self, c: Coords) -> Option<i32> {
        self.hexes.get(&c).map(|h| h.current_cf)
    }

    /// Sets the construction factor at `c`, clamped at zero.
    pub fn set_current_cf(&mut self, c: Coords, cf: i32) {
        if let Some(h) = self.hexes.get_mut(&c) {
            h.current_cf = cf.max(0);
        }
    }

    pub fn armor(&self, c: Coords) -> Option<i32> {
        self.hexes.get(&c).map(|h| h.armor)
    }

    pub fn basement(&self, c: Coords) -> Option<BasementType> {
        self.hexes.get(&c).map(|h| h.basement)
    }

    /// Drops a hex from the structure; returns false if it was not part of it.
    pub fn remove_hex(&mut self, c: Coords) -> bool {
        self.hexes.remove(&c).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }
}

impl BuildingHex {
    fn from_hex(hex: &Hex, structure: StructureKind, building_type: BuildingType) -> Self {
        let cf = hex
            .terrain_level(structure.cf_terrain())
            .unwrap_or_else(|| building_type.default_cf());
        BuildingHex {
            height: hex.terrain_level(structure.elevation_terrain()).unwrap_or(0),
            current_cf: cf,
            phase_cf: cf,
            armor: hex.terrain_level(TerrainKind::BldgArmor).unwrap_or(0),
            basement: hex
                .terrain_level(TerrainKind::BldgBasementType)
                .and_then(BasementType::from_level)
                .unwrap_or_default(),
            basement_collapsed: hex.terrain_level(TerrainKind::BldgBaseCollapsed).unwrap_or(0) > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn grid(entries: &[(Coords, &str)]) -> HashMap<Coords, Hex> {
        entries
            .iter()
            .map(|(c, spec)| (*c, Hex::parse(0, spec, "").unwrap()))
            .collect()
    }

    #[test]
    fn single_hex_building() {
        let c = Coords::new(1, 1);
        let hexes = grid(&[(c, "building:2;bldg_elev:3;bldg_cf:50;bldg_armor:10")]);
        let b = Building::from_board(7, c, StructureKind::Building, |k| hexes.get(&k)).unwrap();
        assert_eq!(b.id(), 7);
        assert_eq!(b.building_type(), BuildingType::Medium);
        assert_eq!(b.height(c), Some(3));
        assert_eq!(b.current_cf(c), Some(50));
        assert_eq!(b.armor(c), Some(10));
        assert_eq!(b.name(), "Medium Building #7");
    }

    #[test]
    fn follows_exits_to_connected_hexes() {
        let a = Coords::new(2, 2);
        let b = a.translated(Facing::South);
        let spec_a = format!("building:1:{};bldg_elev:1", Facing::South.bit());
        let spec_b = format!("building:1:{};bldg_elev:2", Facing::North.bit());
        let hexes = grid(&[(a, &spec_a), (b, &spec_b)]);
        let bldg = Building::from_board(1, a, StructureKind::Building, |k| hexes.get(&k)).unwrap();
        assert_eq!(bldg.hex_count(), 2);
        assert!(bldg.contains(b));
        assert_eq!(bldg.current_cf(b), Some(BuildingType::Light.default_cf()));
    }

    #[test]
    fn mismatched_neighbor_fails() {
        let a = Coords::new(2, 2);
        let b = a.translated(Facing::South);
        let spec_a = format!("building:1:{};bldg_elev:1", Facing::South.bit());
        let hexes = grid(&[(a, &spec_a), (b, "building:3;bldg_elev:1")]);
        let err = Building::from_board(1, a, StructureKind::Building, |k| hexes.get(&k)).unwrap_err();
        assert_eq!(
            err,
            BuildingError::MismatchedNeighbor {
                structure: StructureKind::Building,
                from: a,
                to: b
            }
        );
    }

    #[test]
    fn invalid_type_and_missing_terrain() {
        let c = Coords::new(0, 0);
        let hexes = grid(&[(c, "building:9;bldg_elev:1")]);
        assert!(matches!(
            Building::from_board(1, c, StructureKind::Building, |k| hexes.get(&k)),
            Err(BuildingError::InvalidType { level: 9, .. })
        ));
        assert!(matches!(
            Building::from_board(1, c, StructureKind::Bridge, |k| hexes.get(&k)),
            Err(BuildingError::MissingTerrain { .. })
        ));
    }

    #[test]
    fn bridge_height_and_cf() {
        let c = Coords::new(0, 0);
        let hexes = grid(&[(c, "bridge:2;bridge_elev:2;bridge_cf:30")]);
        let b = Building::from_board(3, c, StructureKind::Bridge, |k| hexes.get(&k)).unwrap();
        assert_eq!(b.structure(), StructureKind::Bridge);
        assert_eq!(b.height(c), Some(2));
        assert_eq!(b.current_cf(c), Some(30));
    }

    #[test]
    fn remove_hex_empties_building() {
        let c = Coords::new(0, 0);
        let hexes = grid(&[(c, "fuel_tank:1;fuel_tank_elev:1;bldg_basement_type:2")]);
        let mut b = Building::from_board(1, c, StructureKind::FuelTank, |k| hexes.get(&k)).unwrap();
        assert_eq!(b.basement(c), Some(BasementType::OneDeepNormal));
        assert!(b.remove_hex(c));
        assert!(!b.remove_hex(c));
        assert!(b.is_empty());
    }

    #[test]
    fn strip_removes_family_only() {
        let mut h = Hex::parse(0, "building:2;bldg_elev:2;bldg_cf:10;woods:1", "").unwrap();
        StructureKind::Building.strip_from(&mut h);
        assert_eq!(h.terrain_kinds().collect::<Vec<_>>(), vec![TerrainKind::Woods]);
    }

    #[test]
    fn cf_clamps_at_zero() {
        let c = Coords::new(0, 0);
        let hexes = grid(&[(c, "building:1;bldg_elev:1")]);
        let mut b = Building::from_board(1, c, StructureKind::Building, |k| hexes.get(&k)).unwrap();
        b.set_current_cf(c, -4);
        assert_eq!(b.current_cf(c), Some(0));
    }
}
