//! Which elevations a unit may be deployed at in a given hex.
//!
//! Rules run in a fixed order, and later rules read what earlier ones
//! produced: water, then bridge or building, then the bridge clearance
//! filter, then lift (VTOL) bands, then ground-effect hops. Finally the
//! unit's own prohibitions and the stacking rule are applied.

use std::collections::HashSet;

use tracing::trace;

use super::elevation::{DeploymentElevationType as Kind, ElevationOption};
use super::unit::{DeployableUnit, NoStacking, StackingRule};
use crate::board::{Board, Coords, Hex, TerrainKind};

/// Highest altitude offered to airborne units.
pub const MAX_ALTITUDE: i32 = 10;

/// Lowest elevation a lift unit is offered as "this and above".
pub const VTOL_BAND_TOP: i32 = 10;

/// Errors from the deployment query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeploymentError {
    #[error("deployment elevations are undefined on a deep-space board")]
    SpaceBoard,
}

/// Computes legal deployment elevations for one unit in one hex.
pub struct AllowedDeploymentHelper<'a> {
    unit: &'a dyn DeployableUnit,
    coords: Coords,
    board: &'a Board,
    hex: &'a Hex,
    stacking: &'a dyn StackingRule,
}

impl<'a> AllowedDeploymentHelper<'a> {
    pub fn new(unit: &'a dyn DeployableUnit, coords: Coords, board: &'a Board, hex: &'a Hex) -> Self {
        AllowedDeploymentHelper {
            unit,
            coords,
            board,
            hex,
            stacking: &NoStacking,
        }
    }

    pub fn with_stacking(mut self, stacking: &'a dyn StackingRule) -> Self {
        self.stacking = stacking;
        self
    }

    /// Every legal option, ascending by elevation.
    pub fn allowed_elevations(&self) -> Result<Vec<ElevationOption>, DeploymentError> {
        if self.board.board_type().is_deep_space() {
            return Err(DeploymentError::SpaceBoard);
        }

        let mut result = Vec::new();
        if self.unit.is_airborne() {
            self.add_altitudes(&mut result);
        } else {
            self.add_water(&mut result);
            self.add_structures(&mut result);
            self.add_ground_fallback(&mut result);
            self.remove_bridge_collisions(&mut result);
            let mode = self.unit.movement_mode();
            if mode.has_lift() {
                self.add_lift_band(&mut result);
            }
            if mode.is_ground_effect() {
                self.add_ground_effect_hops(&mut result);
            }
        }

        result.retain(|o| {
            !self.unit.is_location_prohibited(self.coords, o.elevation, self.hex)
                && !self.stacking.violates(self.coords, o.elevation)
        });
        let mut seen = HashSet::new();
        result.retain(|o| seen.insert(*o));
        result.sort_by(ElevationOption::cmp_elevation);

        trace!(coords = %self.coords, options = result.len(), "computed deployment elevations");
        Ok(result)
    }

    /// The legal options of one type only.
    pub fn allowed_elevations_of_type(&self, kind: Kind) -> Result<Vec<ElevationOption>, DeploymentError> {
        let mut options = self.allowed_elevations()?;
        options.retain(|o| o.kind == kind);
        Ok(options)
    }

    fn add_altitudes(&self, result: &mut Vec<ElevationOption>) {
        let lowest = if self.board.board_type().on_ground() {
            0
        } else {
            (self.hex.ceiling() + 1).max(1)
        };
        result.extend((lowest..=MAX_ALTITUDE).map(|a| ElevationOption::new(a, Kind::Altitude)));
    }

    fn add_water(&self, result: &mut Vec<ElevationOption>) {
        let depth = self.hex.depth();
        if !self.hex.contains_terrain(TerrainKind::Water) || depth <= 0 {
            return;
        }
        let mode = self.unit.movement_mode();
        let ice = self.hex.contains_terrain(TerrainKind::Ice);
        let underwater = self.unit.is_underwater_capable();

        if mode.floats() {
            if !ice {
                result.push(ElevationOption::new(0, Kind::WaterSurface));
            }
        } else if mode.is_scuba() {
            if !ice {
                for d in 1..=depth.min(2) {
                    result.push(ElevationOption::new(-d, Kind::Submerged));
                }
            }
        } else if underwater {
            for d in 1..=depth {
                result.push(ElevationOption::new(-d, Kind::Submerged));
            }
        } else if !ice || self.unit.height() < depth {
            result.push(ElevationOption::new(-depth, Kind::Seafloor));
        }

        if ice && !underwater {
            result.push(ElevationOption::new(0, Kind::Ice));
        }
    }

    fn add_structures(&self, result: &mut Vec<ElevationOption>) {
        let mode = self.unit.movement_mode();
        if let Some(span) = self.bridge_elevation() {
            if !mode.is_naval() {
                result.push(ElevationOption::new(span, Kind::Bridge));
            }
        } else if self.hex.contains_terrain(TerrainKind::Building) {
            let height = self.hex.terrain_level(TerrainKind::BldgElev).unwrap_or(0);
            result.push(ElevationOption::new(0, Kind::Building));
            if !mode.is_ground_vehicle() {
                for floor in 1..height {
                    result.push(ElevationOption::new(floor, Kind::Building));
                }
            }
            if height > 0 {
                result.push(ElevationOption::new(height, Kind::Roof));
            }
        }
    }

    fn add_ground_fallback(&self, result: &mut Vec<ElevationOption>) {
        let dry = !self.hex.contains_terrain(TerrainKind::Water) || self.hex.depth() == 0;
        if dry && !result.iter().any(|o| o.elevation == 0) {
            result.push(ElevationOption::new(0, Kind::OnGround));
        }
    }

    /// Drops options that would put the unit's top inside the bridge span.
    fn remove_bridge_collisions(&self, result: &mut Vec<ElevationOption>) {
        let Some(span) = self.bridge_elevation() else { return };
        let height = self.unit.height();
        result.retain(|o| o.kind == Kind::Bridge || !(o.elevation < span && o.elevation + height >= span));
    }

    fn add_lift_band(&self, result: &mut Vec<ElevationOption>) {
        let top = VTOL_BAND_TOP.max(self.hex.relative_ceiling() + 1);
        for e in 1..top {
            if !result.iter().any(|o| o.elevation == e) {
                result.push(ElevationOption::new(e, Kind::Elevation));
            }
        }
        result.push(ElevationOption::new(top, Kind::ElevationsAbove));
    }

    fn add_ground_effect_hops(&self, result: &mut Vec<ElevationOption>) {
        let landed: Vec<i32> = result
            .iter()
            .filter(|o| o.kind.is_landed())
            .map(|o| o.elevation)
            .collect();
        for e in landed {
            let hop = e + 1;
            if !result.iter().any(|o| o.elevation == hop) {
                result.push(ElevationOption::new(hop, Kind::Elevation));
            }
        }
    }

    fn bridge_elevation(&self) -> Option<i32> {
        if self.hex.contains_terrain(TerrainKind::Bridge) {
            self.hex.terrain_level(TerrainKind::BridgeElev)
        } else {
            None
        }
    }
}

/// Shorthand for `AllowedDeploymentHelper::new(..).allowed_elevations()`.
pub fn allowed_elevations(
    unit: &dyn DeployableUnit,
    coords: Coords,
    board: &Board,
    hex: &Hex,
) -> Result<Vec<ElevationOption>, DeploymentError> {
    AllowedDeploymentHelper::new(unit, coords, board, hex).allowed_elevations()
}
