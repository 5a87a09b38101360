//! The unit capabilities the deployment query consults.

use serde::{Deserialize, Serialize};

use crate::board::{Coords, Hex};

/// How a unit moves; drives which deployment rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    Biped,
    Tripod,
    Quad,
    Tracked,
    Wheeled,
    Hover,
    Naval,
    Hydrofoil,
    Submarine,
    Vtol,
    /// Wing-in-ground-effect craft.
    Wige,
    InfantryLeg,
    InfantryMotorized,
    InfantryJump,
    InfantryScuba,
    Aerodyne,
    Spheroid,
}

impl MovementMode {
    /// Rides on the water surface.
    pub const fn floats(self) -> bool {
        matches!(
            self,
            MovementMode::Naval | MovementMode::Hydrofoil | MovementMode::Hover | MovementMode::Wige
        )
    }

    /// A waterborne vessel; cannot use bridges.
    pub const fn is_naval(self) -> bool {
        matches!(
            self,
            MovementMode::Naval | MovementMode::Hydrofoil | MovementMode::Submarine
        )
    }

    pub const fn is_submarine(self) -> bool {
        matches!(self, MovementMode::Submarine)
    }

    pub const fn is_scuba(self) -> bool {
        matches!(self, MovementMode::InfantryScuba)
    }

    /// Can hold any elevation above the ground.
    pub const fn has_lift(self) -> bool {
        matches!(self, MovementMode::Vtol)
    }

    pub const fn is_ground_effect(self) -> bool {
        matches!(self, MovementMode::Wige)
    }

    /// Vehicles that cannot climb to upper building floors.
    pub const fn is_ground_vehicle(self) -> bool {
        matches!(
            self,
            MovementMode::Tracked | MovementMode::Wheeled | MovementMode::Hover | MovementMode::Wige
        )
    }

    pub const fn is_aerospace(self) -> bool {
        matches!(self, MovementMode::Aerodyne | MovementMode::Spheroid)
    }
}

impl std::str::FromStr for MovementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.to_ascii_lowercase().as_str() {
            "biped" => MovementMode::Biped,
            "tripod" => MovementMode::Tripod,
            "quad" => MovementMode::Quad,
            "tracked" => MovementMode::Tracked,
            "wheeled" => MovementMode::Wheeled,
            "hover" => MovementMode::Hover,
            "naval" => MovementMode::Naval,
            "hydrofoil" => MovementMode::Hydrofoil,
            "submarine" => MovementMode::Submarine,
            "vtol" => MovementMode::Vtol,
            "wige" => MovementMode::Wige,
            "leg" => MovementMode::InfantryLeg,
            "motorized" => MovementMode::InfantryMotorized,
            "jump" => MovementMode::InfantryJump,
            "scuba" => MovementMode::InfantryScuba,
            "aerodyne" => MovementMode::Aerodyne,
            "spheroid" => MovementMode::Spheroid,
            _ => return Err(format!("unknown movement mode '{s}'")),
        };
        Ok(mode)
    }
}

/// A unit being placed on the board.
pub trait DeployableUnit {
    fn movement_mode(&self) -> MovementMode;

    /// Levels the unit occupies above its own elevation.
    fn height(&self) -> i32 {
        0
    }

    /// Deployed at altitude rather than on or near the surface.
    fn is_airborne(&self) -> bool {
        false
    }

    fn is_underwater_capable(&self) -> bool {
        self.movement_mode().is_submarine()
    }

    /// The unit's own placement restrictions, e.g. a vehicle too heavy for a bridge.
    fn is_location_prohibited(&self, _coords: Coords, _elevation: i32, _hex: &Hex) -> bool {
        false
    }
}

/// A plain unit description for callers without their own unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitProfile {
    pub mode: MovementMode,
    pub height: i32,
    #[serde(default)]
    pub airborne: bool,
}

impl UnitProfile {
    pub const fn new(mode: MovementMode, height: i32) -> Self {
        UnitProfile {
            mode,
            height,
            airborne: false,
        }
    }

    pub const fn airborne(mut self) -> Self {
        self.airborne = true;
        self
    }
}

impl DeployableUnit for UnitProfile {
    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_airborne(&self) -> bool {
        self.airborne
    }
}

/// Decides whether placing a unit would break the stacking limits of a hex.
pub trait StackingRule {
    fn violates(&self, coords: Coords, elevation: i32) -> bool;
}

impl<F> StackingRule for F
where
    F: Fn(Coords, i32) -> bool,
{
    fn violates(&self, coords: Coords, elevation: i32) -> bool {
        self(coords, elevation)
    }
}

/// A stacking rule that never objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStacking;

impl StackingRule for NoStacking {
    fn violates(&self, _coords: Coords, _elevation: i32) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_flags() {
        assert!(MovementMode::Hover.floats());
        assert!(MovementMode::Hover.is_ground_vehicle());
        assert!(!MovementMode::Submarine.floats());
        assert!(MovementMode::Submarine.is_naval());
        assert!(MovementMode::Vtol.has_lift());
        assert!(!MovementMode::Biped.is_ground_vehicle());
    }

    #[test]
    fn profile_defaults_to_submarine_rule() {
        let sub = UnitProfile::new(MovementMode::Submarine, 0);
        assert!(sub.is_underwater_capable());
        assert!(!UnitProfile::new(MovementMode::InfantryScuba, 0).is_underwater_capable());
        assert!(UnitProfile::new(MovementMode::Aerodyne, 0).airborne().is_airborne());
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("VTOL".parse::<MovementMode>(), Ok(MovementMode::Vtol));
        assert_eq!("scuba".parse::<MovementMode>(), Ok(MovementMode::InfantryScuba));
        assert!("hovercraft".parse::<MovementMode>().is_err());
    }
}
