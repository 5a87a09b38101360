//! The board: a flat grid of hexes plus everything indexed by coordinate.
//!
//! Every mutation goes through `new_data`, `set_hex` or `set_hexes`, which
//! re-derive exits, structures and automatic terrain so the grid stays
//! internally consistent. Derived caches (elevation range, deployment zones)
//! are cleared before each mutation and rebuilt lazily on the next query.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::auto_terrain;
use super::building::{Building, StructureKind};
use super::coords::{Coords, Facing};
use super::dimensions::{BoardDimensions, BoardType};
use super::events::{BoardEvent, BoardListener};
use super::hex::Hex;
use super::markers::{Inferno, SpecialHexDisplay};
use super::terrain::{Terrain, TerrainKind};
use super::zones::{in_builtin_zone, DeploymentArea, HexArea, StartZone};

/// Board-wide settings that change how terrain is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardOptions {
    /// Roads automatically connect into adjacent pavement.
    pub roads_auto_exit: bool,
    /// Derive plain inclines; cliffs and high inclines are always derived.
    pub show_inclines: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        BoardOptions {
            roads_auto_exit: true,
            show_inclines: true,
        }
    }
}

/// A hex on a particular board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardLocation {
    pub board_id: i32,
    pub coords: Coords,
}

/// A hex map with its structures and per-hex auxiliary state.
pub struct Board {
    board_id: i32,
    dims: BoardDimensions,
    /// Row-major cells. A `None` slot is a structural defect reported by `is_valid`.
    data: Vec<Option<Hex>>,
    board_type: BoardType,
    options: BoardOptions,

    buildings: BTreeMap<u32, Building>,
    building_index: HashMap<Coords, u32>,
    next_building_id: u32,
    building_errors: Vec<String>,

    infernos: HashMap<Coords, Inferno>,
    special_displays: HashMap<Coords, Vec<SpecialHexDisplay>>,
    annotations: BTreeMap<Coords, Vec<String>>,
    tags: BTreeSet<String>,
    description: Option<String>,

    enclosing: Option<BoardLocation>,
    embedded: BTreeMap<Coords, i32>,

    custom_zones: BTreeMap<u32, HexArea>,
    zone_cache: OnceCell<HashMap<u32, HashSet<Coords>>>,
    elevation_range: OnceCell<(i32, i32)>,

    listeners: Vec<Box<dyn BoardListener>>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("board_id", &self.board_id)
            .field("dims", &self.dims)
            .field("board_type", &self.board_type)
            .field("options", &self.options)
            .field("buildings", &self.buildings.len())
            .field("tags", &self.tags)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(0, BoardDimensions::default())
    }
}

impl Board {
    /// A board of blank level-0 hexes.
    pub fn new(board_id: i32, dims: BoardDimensions) -> Self {
        let mut board = Board {
            board_id,
            dims,
            data: Vec::new(),
            board_type: BoardType::default(),
            options: BoardOptions::default(),
            buildings: BTreeMap::new(),
            building_index: HashMap::new(),
            next_building_id: 1,
            building_errors: Vec::new(),
            infernos: HashMap::new(),
            special_displays: HashMap::new(),
            annotations: BTreeMap::new(),
            tags: BTreeSet::new(),
            description: None,
            enclosing: None,
            embedded: BTreeMap::new(),
            custom_zones: BTreeMap::new(),
            zone_cache: OnceCell::new(),
            elevation_range: OnceCell::new(),
            listeners: Vec::new(),
        };
        let blank = vec![Some(Hex::default()); dims.area()];
        board.new_data(dims, blank);
        board
    }

    pub fn board_id(&self) -> i32 {
        self.board_id
    }

    pub fn dimensions(&self) -> BoardDimensions {
        self.dims
    }

    pub fn width(&self) -> i32 {
        self.dims.width()
    }

    pub fn height(&self) -> i32 {
        self.dims.height()
    }

    pub fn contains(&self, c: Coords) -> bool {
        self.dims.contains(c)
    }

    pub fn board_type(&self) -> BoardType {
        self.board_type
    }

    pub fn set_board_type(&mut self, board_type: BoardType) {
        self.board_type = board_type;
    }

    pub fn options(&self) -> BoardOptions {
        self.options
    }

    /// Replaces the board options, re-deriving the whole grid if they changed.
    pub fn set_options(&mut self, options: BoardOptions) {
        if self.options == options {
            return;
        }
        self.options = options;
        self.invalidate_caches();
        self.rebuild_all_exits();
        self.rebuild_all_auto_terrain();
        self.fire(BoardEvent::AllHexesChanged);
    }

    pub fn set_roads_auto_exit(&mut self, value: bool) {
        self.set_options(BoardOptions {
            roads_auto_exit: value,
            ..self.options
        });
    }

    pub fn set_show_inclines(&mut self, value: bool) {
        self.set_options(BoardOptions {
            show_inclines: value,
            ..self.options
        });
    }

    pub fn hex(&self, c: Coords) -> Option<&Hex> {
        self.dims.index_of(c).and_then(|i| self.data[i].as_ref())
    }

    /// All present hexes in row-major order.
    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.data.iter().flatten()
    }

    /// On-board coordinates within `radius` steps of `center`.
    pub fn hexes_in_range(&self, center: Coords, radius: i32) -> Vec<Coords> {
        center
            .within_radius(radius)
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Installs a whole new grid and rebuilds everything derived from it.
    ///
    /// `data` is padded with empty slots or truncated to fit `dims`.
    /// Malformed structures are stripped from their hexes and recorded in
    /// `building_errors`; an invalid board is logged but still installed.
    pub fn new_data(&mut self, dims: BoardDimensions, mut data: Vec<Option<Hex>>) {
        data.resize(dims.area(), None);
        for (i, slot) in data.iter_mut().enumerate() {
            if let Some(hex) = slot {
                hex.set_coords(dims.coords_of(i));
            }
        }
        self.dims = dims;
        self.data = data;
        self.invalidate_caches();

        self.buildings.clear();
        self.building_index.clear();
        self.building_errors.clear();

        self.rebuild_all_exits();
        for i in 0..self.data.len() {
            self.register_structures_at(self.dims.coords_of(i));
        }
        self.rebuild_all_auto_terrain();

        let mut errors = Vec::new();
        if !self.is_valid(Some(&mut errors)) {
            for e in &errors {
                warn!(board = self.board_id, "{e}");
            }
        }
        debug!(
            board = self.board_id,
            size = %self.dims,
            buildings = self.buildings.len(),
            "installed new board data"
        );
        self.fire(BoardEvent::NewBoard);
    }

    /// Replaces one hex. Out-of-bounds coordinates are ignored.
    pub fn set_hex(&mut self, c: Coords, hex: Hex) {
        if !self.install([(c, hex)]).is_empty() {
            self.fire(BoardEvent::HexChanged(c));
        }
    }

    /// Replaces many hexes at once, firing a single board-wide event.
    pub fn set_hexes(&mut self, entries: impl IntoIterator<Item = (Coords, Hex)>) {
        if !self.install(entries).is_empty() {
            self.fire(BoardEvent::AllHexesChanged);
        }
    }

    fn install(&mut self, entries: impl IntoIterator<Item = (Coords, Hex)>) -> Vec<Coords> {
        let mut changed = Vec::new();
        let mut orphaned = BTreeSet::new();
        for (c, mut hex) in entries {
            let Some(i) = self.dims.index_of(c) else {
                trace!(board = self.board_id, coords = %c, "dropping off-board hex");
                continue;
            };
            hex.set_coords(c);
            orphaned.extend(self.release_building_at(c));
            self.data[i] = Some(hex);
            changed.push(c);
        }
        if changed.is_empty() {
            return changed;
        }
        self.invalidate_caches();
        self.building_errors.clear();

        let mut affected = BTreeSet::new();
        for c in &changed {
            affected.insert(*c);
            affected.extend(c.neighbors().into_iter().filter(|n| self.contains(*n)));
        }
        for c in &affected {
            self.rebuild_exits_at(*c);
        }
        for c in changed.iter().chain(&orphaned) {
            self.register_structures_at(*c);
        }
        for c in &affected {
            self.rebuild_auto_terrain_at(*c);
        }
        changed
    }

    fn rebuild_exits_at(&mut self, c: Coords) {
        let Some(i) = self.dims.index_of(c) else { return };
        let Some(mut hex) = self.data[i].take() else { return };
        hex.clear_exits();
        for dir in Facing::ALL {
            hex.set_exits(self.hex(c.translated(dir)), dir, self.options.roads_auto_exit);
        }
        self.data[i] = Some(hex);
    }

    fn rebuild_auto_terrain_at(&mut self, c: Coords) {
        let Some(i) = self.dims.index_of(c) else { return };
        let Some(mut hex) = self.data[i].take() else { return };
        let neighbors = Facing::ALL.map(|dir| self.hex(c.translated(dir)));
        auto_terrain::derive(&hex, &neighbors, self.options.show_inclines).apply_to(&mut hex);
        self.data[i] = Some(hex);
    }

    fn rebuild_all_exits(&mut self) {
        for i in 0..self.data.len() {
            self.rebuild_exits_at(self.dims.coords_of(i));
        }
    }

    fn rebuild_all_auto_terrain(&mut self) {
        for i in 0..self.data.len() {
            self.rebuild_auto_terrain_at(self.dims.coords_of(i));
        }
    }

    fn invalidate_caches(&mut self) {
        self.zone_cache.take();
        self.elevation_range.take();
    }

    pub fn add_listener(&mut self, listener: impl BoardListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn fire(&mut self, event: BoardEvent) {
        for listener in &mut self.listeners {
            listener.board_changed(self.board_id, &event);
        }
    }

    // ------------------------------------------------------------------
    // Structures
    // ------------------------------------------------------------------

    /// Builds the structure starting at `c` unless the hex is already indexed.
    fn register_structures_at(&mut self, c: Coords) {
        if self.building_index.contains_key(&c) {
            return;
        }
        let Some(hex) = self.hex(c) else { return };
        let Some(structure) = StructureKind::ALL
            .into_iter()
            .find(|s| hex.contains_terrain(s.terrain()))
        else {
            return;
        };

        let id = self.next_building_id;
        match Building::from_board(id, c, structure, |k| self.hex(k)) {
            Ok(building) => {
                self.next_building_id += 1;
                let coords: Vec<Coords> = building.coords().collect();
                for k in &coords {
                    self.unindex_building_hex(*k);
                    self.building_index.insert(*k, id);
                }
                trace!(board = self.board_id, id, name = building.name(), hexes = coords.len(), "registered structure");
                self.buildings.insert(id, building);
            }
            Err(e) => {
                warn!(board = self.board_id, coords = %c, error = %e, "stripping malformed structure terrain");
                self.building_errors.push(e.to_string());
                if let Some(hex) = self.dims.index_of(c).and_then(|i| self.data[i].as_mut()) {
                    structure.strip_from(hex);
                }
                self.rebuild_exits_at(c);
                for n in c.neighbors() {
                    self.rebuild_exits_at(n);
                }
            }
        }
    }

    /// Drops the whole structure standing on `c` and returns its other hexes.
    ///
    /// Editing one hex can split a structure in two, so the survivors are
    /// registered again from scratch once the edit is in place.
    fn release_building_at(&mut self, c: Coords) -> Vec<Coords> {
        let Some(id) = self.building_index.get(&c).copied() else {
            return Vec::new();
        };
        let Some(building) = self.buildings.remove(&id) else {
            self.building_index.remove(&c);
            return Vec::new();
        };
        let coords: Vec<Coords> = building.coords().collect();
        for k in &coords {
            self.building_index.remove(k);
        }
        coords.into_iter().filter(|k| *k != c).collect()
    }

    fn unindex_building_hex(&mut self, c: Coords) {
        let Some(id) = self.building_index.remove(&c) else { return };
        if let Some(building) = self.buildings.get_mut(&id) {
            building.remove_hex(c);
            if building.is_empty() {
                self.buildings.remove(&id);
            }
        }
    }

    pub fn building_at(&self, c: Coords) -> Option<&Building> {
        self.building_index.get(&c).and_then(|id| self.buildings.get(id))
    }

    pub fn building(&self, id: u32) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn building_mut(&mut self, id: u32) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// Errors from structures that could not be built by the last `new_data`,
    /// `set_hex` or `set_hexes`.
    pub fn building_errors(&self) -> &[String] {
        &self.building_errors
    }

    /// Turns the structure at `c` into rubble. Returns false if there was none.
    ///
    /// The rubble level is the highest structure type removed from the hex.
    pub fn collapse_building(&mut self, c: Coords) -> bool {
        match self.collapsed_hex(c) {
            Some(hex) => {
                debug!(board = self.board_id, coords = %c, "structure collapsed");
                self.set_hex(c, hex);
                true
            }
            None => false,
        }
    }

    /// Collapses every hex of a building; returns the number of hexes collapsed.
    pub fn collapse_whole_building(&mut self, id: u32) -> usize {
        let Some(building) = self.buildings.get(&id) else { return 0 };
        let rubble: Vec<(Coords, Hex)> = building
            .coords()
            .filter_map(|c| self.collapsed_hex(c).map(|h| (c, h)))
            .collect();
        let count = rubble.len();
        debug!(board = self.board_id, id, hexes = count, "building collapsed");
        self.set_hexes(rubble);
        count
    }

    fn collapsed_hex(&self, c: Coords) -> Option<Hex> {
        let mut hex = self.hex(c)?.clone();
        let mut rubble_level = None;
        for structure in StructureKind::ALL {
            if let Some(level) = hex.terrain_level(structure.terrain()) {
                rubble_level = Some(rubble_level.map_or(level, |r: i32| r.max(level)));
            }
            structure.strip_from(&mut hex);
        }
        hex.add_terrain(Terrain::new(TerrainKind::Rubble, rubble_level?));
        Some(hex)
    }

    // ------------------------------------------------------------------
    // Elevation
    // ------------------------------------------------------------------

    fn elevation_range(&self) -> (i32, i32) {
        *self.elevation_range.get_or_init(|| {
            self.hexes()
                .map(Hex::level)
                .fold(None, |acc: Option<(i32, i32)>, l| {
                    Some(acc.map_or((l, l), |(lo, hi)| (lo.min(l), hi.max(l))))
                })
                .unwrap_or((0, 0))
        })
    }

    pub fn min_elevation(&self) -> i32 {
        self.elevation_range().0
    }

    pub fn max_elevation(&self) -> i32 {
        self.elevation_range().1
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Checks every hex and every structure exit.
    ///
    /// Problems are appended to `errors` when given. A missing hex aborts the
    /// check immediately.
    pub fn is_valid(&self, mut errors: Option<&mut Vec<String>>) -> bool {
        let mut valid = true;
        for (i, slot) in self.data.iter().enumerate() {
            let Some(hex) = slot else {
                if let Some(errs) = errors.as_deref_mut() {
                    errs.push(format!("Hex {}: missing", self.dims.coords_of(i)));
                }
                return false;
            };
            valid &= hex.is_valid(errors.as_deref_mut());
            valid &= self.structure_exits_valid(hex, errors.as_deref_mut());
        }
        valid
    }

    fn structure_exits_valid(&self, hex: &Hex, mut errors: Option<&mut Vec<String>>) -> bool {
        let mut valid = true;
        let c = hex.coords();
        let class = hex.terrain_level(TerrainKind::BldgClass).unwrap_or(0);
        for structure in StructureKind::ALL {
            let kind = structure.terrain();
            let Some(level) = hex.terrain_level(kind) else { continue };
            for dir in Facing::ALL {
                if !hex.contains_exit(kind, dir) {
                    continue;
                }
                let Some(other) = self.hex(c.translated(dir)) else { continue };
                let Some(other_level) = other.terrain_level(kind) else { continue };
                let other_class = other.terrain_level(TerrainKind::BldgClass).unwrap_or(0);
                if other_level != level || other_class != class {
                    valid = false;
                    if let Some(errs) = errors.as_deref_mut() {
                        errs.push(format!(
                            "Hex {c}: {structure} exit {} reaches a {structure} of a different type or class",
                            dir.abbr()
                        ));
                    }
                }
            }
        }
        valid
    }

    // ------------------------------------------------------------------
    // Deployment zones
    // ------------------------------------------------------------------

    /// True if `c` lies on the board and inside the deployment area.
    pub fn is_legal_deployment(&self, c: Coords, area: &DeploymentArea) -> bool {
        if !self.contains(c) {
            return false;
        }
        match in_builtin_zone(c, area, self.dims) {
            Some(inside) => inside,
            None => match area.zone {
                StartZone::Custom(id) => self
                    .zone_cache()
                    .get(&id)
                    .is_some_and(|hexes| hexes.contains(&c)),
                _ => false,
            },
        }
    }

    /// Registers a declarative custom zone, overlaid on any terrain markers with the same id.
    pub fn add_custom_zone(&mut self, id: u32, area: HexArea) {
        self.custom_zones.insert(id, area);
        self.invalidate_deployment_zones();
    }

    pub fn remove_custom_zone(&mut self, id: u32) -> Option<HexArea> {
        let removed = self.custom_zones.remove(&id);
        self.invalidate_deployment_zones();
        removed
    }

    /// Ids of every custom zone present on the board, ascending.
    pub fn custom_deployment_zone_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.zone_cache().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn deployment_zone_hexes(&self, id: u32) -> Option<&HashSet<Coords>> {
        self.zone_cache().get(&id)
    }

    pub fn invalidate_deployment_zones(&mut self) {
        self.zone_cache.take();
    }

    fn zone_cache(&self) -> &HashMap<u32, HashSet<Coords>> {
        self.zone_cache.get_or_init(|| {
            let mut zones: HashMap<u32, HashSet<Coords>> = HashMap::new();
            for hex in self.hexes() {
                let Some(marker) = hex.terrain(TerrainKind::DeploymentZone) else { continue };
                let bits = marker.exits();
                for id in (0..u32::BITS).filter(|b| bits & (1 << b) != 0) {
                    zones.entry(id).or_default().insert(hex.coords());
                }
            }
            for (id, area) in &self.custom_zones {
                zones.entry(*id).or_default().extend(area.resolve(self));
            }
            debug!(board = self.board_id, zones = zones.len(), "resolved deployment zones");
            zones
        })
    }

    // ------------------------------------------------------------------
    // Per-hex auxiliary state
    // ------------------------------------------------------------------

    pub fn inferno(&self, c: Coords) -> Option<&Inferno> {
        self.infernos.get(&c)
    }

    /// Starts a fire, or feeds an existing one with more burning turns.
    pub fn add_inferno(&mut self, c: Coords, inferno: Inferno) {
        self.infernos
            .entry(c)
            .and_modify(|fire| fire.add(inferno.turns_remaining))
            .or_insert(inferno);
    }

    pub fn clear_inferno(&mut self, c: Coords) -> Option<Inferno> {
        self.infernos.remove(&c)
    }

    /// Burns one turn off every fire and returns the hexes that burned out.
    pub fn burn_down(&mut self) -> Vec<Coords> {
        let mut out = Vec::new();
        self.infernos.retain(|c, fire| {
            let burning = fire.burn_turn();
            if !burning {
                out.push(*c);
            }
            burning
        });
        out.sort();
        out
    }

    pub fn special_displays(&self, c: Coords) -> &[SpecialHexDisplay] {
        self.special_displays.get(&c).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add_special_display(&mut self, c: Coords, display: SpecialHexDisplay) {
        self.special_displays.entry(c).or_default().push(display);
    }

    /// Removes the first matching marker; returns false if none matched.
    pub fn remove_special_display(&mut self, c: Coords, display: &SpecialHexDisplay) -> bool {
        let Some(list) = self.special_displays.get_mut(&c) else { return false };
        let Some(pos) = list.iter().position(|d| d == display) else { return false };
        list.remove(pos);
        if list.is_empty() {
            self.special_displays.remove(&c);
        }
        true
    }

    pub fn clear_special_displays(&mut self) {
        self.special_displays.clear();
    }

    pub fn annotations(&self, c: Coords) -> &[String] {
        self.annotations.get(&c).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every annotated hex, in coordinate order.
    pub fn all_annotations(&self) -> impl Iterator<Item = (Coords, &[String])> {
        self.annotations.iter().map(|(c, notes)| (*c, notes.as_slice()))
    }

    pub fn add_annotation(&mut self, c: Coords, text: impl Into<String>) {
        self.annotations.entry(c).or_default().push(text.into());
    }

    /// Replaces the annotations of a hex; an empty list removes them.
    pub fn set_annotations(&mut self, c: Coords, notes: Vec<String>) {
        if notes.is_empty() {
            self.annotations.remove(&c);
        } else {
            self.annotations.insert(c, notes);
        }
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    // ------------------------------------------------------------------
    // Embedding
    // ------------------------------------------------------------------

    /// Nests `child` inside the hex `at` of `parent`, recording both directions.
    pub fn embed(parent: &mut Board, child: &mut Board, at: Coords) {
        parent.embedded.insert(at, child.board_id);
        child.enclosing = Some(BoardLocation {
            board_id: parent.board_id,
            coords: at,
        });
    }

    pub fn enclosing_board(&self) -> Option<BoardLocation> {
        self.enclosing
    }

    pub fn embedded_board_at(&self, c: Coords) -> Option<i32> {
        self.embedded.get(&c).copied()
    }

    pub fn embedded_boards(&self) -> impl Iterator<Item = (Coords, i32)> + '_ {
        self.embedded.iter().map(|(c, id)| (*c, *id))
    }
}
