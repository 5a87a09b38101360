//! A single board cell: elevation, terrain set and theme.

use std::collections::BTreeMap;

use super::coords::{Coords, Facing};
use super::terrain::{parse_terrain_list, Terrain, TerrainKind, TerrainParseError};

/// Foliage height assumed for woods and jungle without an explicit `foliage_elev`.
const DEFAULT_FOLIAGE_ELEV: i32 = 2;

/// One hex of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hex {
    level: i32,
    terrains: BTreeMap<TerrainKind, Terrain>,
    theme: String,
    coords: Coords,
}

impl Hex {
    pub fn new(level: i32) -> Self {
        Hex {
            level,
            ..Hex::default()
        }
    }

    pub fn with_terrains(level: i32, terrains: impl IntoIterator<Item = Terrain>) -> Self {
        let mut hex = Hex::new(level);
        for t in terrains {
            hex.add_terrain(t);
        }
        hex
    }

    /// Builds a hex from a `;`-separated terrain list, failing on the first bad entry.
    pub fn parse(level: i32, spec: &str, theme: &str) -> Result<Self, TerrainParseError> {
        let (terrains, errors) = parse_terrain_list(spec);
        if let Some(e) = errors.into_iter().next() {
            return Err(e);
        }
        let mut hex = Hex::with_terrains(level, terrains);
        hex.theme = theme.to_string();
        Ok(hex)
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level;
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
    }

    /// The coordinate this hex was installed at.
    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub(crate) fn set_coords(&mut self, coords: Coords) {
        self.coords = coords;
    }

    pub fn contains_terrain(&self, kind: TerrainKind) -> bool {
        self.terrains.contains_key(&kind)
    }

    pub fn contains_any_terrain(&self, kinds: &[TerrainKind]) -> bool {
        kinds.iter().any(|k| self.contains_terrain(*k))
    }

    pub fn terrain(&self, kind: TerrainKind) -> Option<&Terrain> {
        self.terrains.get(&kind)
    }

    pub fn terrain_level(&self, kind: TerrainKind) -> Option<i32> {
        self.terrains.get(&kind).map(Terrain::level)
    }

    /// True if the terrain is present and has an exit toward `dir`.
    pub fn contains_exit(&self, kind: TerrainKind, dir: Facing) -> bool {
        self.terrain(kind).is_some_and(|t| t.has_exit(dir))
    }

    /// Adds a terrain, replacing any existing terrain of the same kind.
    pub fn add_terrain(&mut self, terrain: Terrain) {
        self.terrains.insert(terrain.kind(), terrain);
    }

    pub fn remove_terrain(&mut self, kind: TerrainKind) -> Option<Terrain> {
        self.terrains.remove(&kind)
    }

    pub fn terrains(&self) -> impl Iterator<Item = &Terrain> {
        self.terrains.values()
    }

    pub fn terrain_kinds(&self) -> impl Iterator<Item = TerrainKind> + '_ {
        self.terrains.keys().copied()
    }

    /// True when the hex carries nothing but its elevation.
    pub fn is_clear(&self) -> bool {
        self.terrains.is_empty()
    }

    /// Water depth, or 0 without water.
    pub fn depth(&self) -> i32 {
        self.terrain_level(TerrainKind::Water).unwrap_or(0).max(0)
    }

    /// Lowest occupiable surface elevation.
    pub fn floor(&self) -> i32 {
        self.level - self.depth()
    }

    /// Highest point of anything standing on the hex, as an absolute elevation.
    pub fn ceiling(&self) -> i32 {
        self.level + self.relative_ceiling()
    }

    /// Height of the tallest structure or foliage above the hex level.
    pub fn relative_ceiling(&self) -> i32 {
        let mut top = 0;
        for kind in [
            TerrainKind::BldgElev,
            TerrainKind::BridgeElev,
            TerrainKind::FuelTankElev,
        ] {
            if let Some(elev) = self.terrain_level(kind) {
                top = top.max(elev);
            }
        }
        if self.contains_any_terrain(&[TerrainKind::Woods, TerrainKind::Jungle]) {
            let foliage = self
                .terrain_level(TerrainKind::FoliageElev)
                .unwrap_or(DEFAULT_FOLIAGE_ELEV);
            top = top.max(foliage);
        }
        top
    }

    /// Clears every derived exit mask.
    pub fn clear_exits(&mut self) {
        for t in self.terrains.values_mut() {
            t.clear_exits();
        }
    }

    /// Derives exits toward `dir` from the neighbor hex (absent off-board).
    ///
    /// Only terrain without an authored exit mask is touched. Buildings also
    /// require a matching class; roads optionally run into pavement.
    pub fn set_exits(&mut self, other: Option<&Hex>, dir: Facing, roads_auto_exit: bool) {
        let own_class = self.terrain_level(TerrainKind::BldgClass).unwrap_or(0);
        for t in self.terrains.values_mut() {
            if t.exits_specified() || !t.kind().auto_connects() {
                continue;
            }
            let open = match other {
                Some(o) => {
                    let mut open = t.exits_to(o.terrain(t.kind()));
                    if open && t.kind() == TerrainKind::Building {
                        open = o.terrain_level(TerrainKind::BldgClass).unwrap_or(0) == own_class;
                    }
                    if t.kind() == TerrainKind::Road && roads_auto_exit {
                        open |= o.contains_terrain(TerrainKind::Pavement);
                    }
                    open
                }
                None => false,
            };
            t.set_exit(dir, open);
        }
    }

    /// Removes every automatically derived terrain.
    pub fn remove_automatic_terrain(&mut self) {
        self.terrains.retain(|k, _| !k.is_automatic());
    }

    /// The `;`-separated terrain list, optionally leaving out derived terrain.
    pub fn terrain_spec(&self, include_automatic: bool) -> String {
        self.terrains
            .values()
            .filter(|t| include_automatic || !t.kind().is_automatic())
            .map(Terrain::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Checks the hex's terrain for internal consistency.
    ///
    /// Problems are appended to `errors` when given; the return value is
    /// false if any were found.
    pub fn is_valid(&self, mut errors: Option<&mut Vec<String>>) -> bool {
        let mut valid = true;
        let mut report = |msg: String| {
            valid = false;
            if let Some(errs) = errors.as_deref_mut() {
                errs.push(format!("Hex {}: {}", self.coords, msg));
            }
        };

        if let Some(depth) = self.terrain_level(TerrainKind::Water) {
            if depth < 0 {
                report(format!("water depth {depth} is negative"));
            }
        }
        for kind in [TerrainKind::Woods, TerrainKind::Jungle] {
            if let Some(density) = self.terrain_level(kind) {
                if !(1..=3).contains(&density) {
                    report(format!("{kind} density {density} outside 1-3"));
                }
            }
        }
        if self.contains_terrain(TerrainKind::Woods) && self.contains_terrain(TerrainKind::Jungle) {
            report("woods and jungle in the same hex".to_string());
        }
        if let Some(kind) = self.terrain_level(TerrainKind::Building) {
            if !(1..=5).contains(&kind) {
                report(format!("building type {kind} outside 1-5"));
            }
            if self.terrain_level(TerrainKind::BldgElev).unwrap_or(0) < 1 {
                report("building without a positive bldg_elev".to_string());
            }
        }
        if self.contains_terrain(TerrainKind::Bridge) {
            if self.terrain_level(TerrainKind::BridgeElev).is_none() {
                report("bridge without bridge_elev".to_string());
            }
            if self.terrain_level(TerrainKind::BridgeCf).is_none() {
                report("bridge without bridge_cf".to_string());
            }
        }
        if self.contains_terrain(TerrainKind::FuelTank)
            && self.terrain_level(TerrainKind::FuelTankElev).unwrap_or(0) < 1
        {
            report("fuel tank without a positive fuel_tank_elev".to_string());
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(level: i32, spec: &str) -> Hex {
        Hex::parse(level, spec, "").unwrap()
    }

    #[test]
    fn floor_subtracts_water_depth() {
        assert_eq!(hex(3, "water:2").floor(), 1);
        assert_eq!(hex(3, "").floor(), 3);
        assert_eq!(hex(0, "water:0").floor(), 0);
    }

    #[test]
    fn ceiling_uses_tallest_feature() {
        assert_eq!(hex(1, "").ceiling(), 1);
        assert_eq!(hex(1, "building:2;bldg_elev:3;bldg_cf:40").ceiling(), 4);
        assert_eq!(hex(0, "woods:1").relative_ceiling(), 2);
        assert_eq!(hex(0, "woods:1;foliage_elev:1").relative_ceiling(), 1);
        assert_eq!(hex(0, "bridge:1;bridge_elev:5;bridge_cf:40;woods:1").relative_ceiling(), 5);
    }

    #[test]
    fn set_exits_matches_same_terrain() {
        let mut road = hex(0, "road:1");
        let other = hex(0, "road:1");
        road.set_exits(Some(&other), Facing::North, true);
        assert!(road.contains_exit(TerrainKind::Road, Facing::North));
        road.set_exits(None, Facing::North, true);
        assert!(!road.contains_exit(TerrainKind::Road, Facing::North));
    }

    #[test]
    fn roads_run_into_pavement_when_enabled() {
        let mut road = hex(0, "road:1");
        let pavement = hex(0, "pavement:1");
        road.set_exits(Some(&pavement), Facing::South, false);
        assert!(!road.contains_exit(TerrainKind::Road, Facing::South));
        road.set_exits(Some(&pavement), Facing::South, true);
        assert!(road.contains_exit(TerrainKind::Road, Facing::South));
    }

    #[test]
    fn buildings_connect_only_with_same_type_and_class() {
        let mut a = hex(0, "building:2;bldg_elev:2;bldg_class:0");
        a.set_exits(Some(&hex(0, "building:2;bldg_elev:3")), Facing::NorthEast, true);
        assert!(a.contains_exit(TerrainKind::Building, Facing::NorthEast));
        a.set_exits(Some(&hex(0, "building:3;bldg_elev:2")), Facing::NorthEast, true);
        assert!(!a.contains_exit(TerrainKind::Building, Facing::NorthEast));
        a.set_exits(Some(&hex(0, "building:2;bldg_elev:2;bldg_class:1")), Facing::NorthEast, true);
        assert!(!a.contains_exit(TerrainKind::Building, Facing::NorthEast));
    }

    #[test]
    fn authored_exits_are_untouched() {
        let mut road = hex(0, "road:1:8");
        road.set_exits(None, Facing::South, true);
        assert!(road.contains_exit(TerrainKind::Road, Facing::South));
        road.clear_exits();
        assert_eq!(road.terrain(TerrainKind::Road).unwrap().exits(), 8);
    }

    #[test]
    fn terrain_spec_filters_automatic() {
        let mut h = hex(0, "woods:1");
        h.add_terrain(Terrain::with_exits(TerrainKind::InclineTop, 1, 3));
        assert_eq!(h.terrain_spec(true), "woods:1;incline_top:1:3");
        assert_eq!(h.terrain_spec(false), "woods:1");
        h.remove_automatic_terrain();
        assert!(!h.contains_terrain(TerrainKind::InclineTop));
    }

    #[test]
    fn validity_reports_problems() {
        let mut errors = Vec::new();
        assert!(hex(0, "woods:2;water:1").is_valid(Some(&mut errors)));
        assert!(errors.is_empty());

        assert!(!hex(0, "woods:5").is_valid(Some(&mut errors)));
        assert_eq!(errors.len(), 1);
        assert!(!hex(0, "building:2").is_valid(Some(&mut errors)));
        assert!(!hex(0, "bridge:1").is_valid(None));
        assert!(errors.iter().all(|e| e.starts_with("Hex (0, 0)")));
    }

    #[test]
    fn parse_rejects_unknown_terrain() {
        assert!(Hex::parse(0, "woods:1;lava:2", "").is_err());
    }
}
