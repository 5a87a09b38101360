//! The result unit of the deployment query: an elevation and what it means.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// What a deployment elevation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentElevationType {
    OnGround,
    WaterSurface,
    Submerged,
    Seafloor,
    Ice,
    Bridge,
    /// A floor inside a building, ground floor included.
    Building,
    Roof,
    /// Hovering or flying at a specific elevation.
    Elevation,
    /// This elevation and every one above it.
    ElevationsAbove,
    Altitude,
}

impl DeploymentElevationType {
    /// True for positions resting on a surface a ground-effect craft could lift off from.
    pub const fn is_landed(self) -> bool {
        matches!(
            self,
            DeploymentElevationType::OnGround
                | DeploymentElevationType::WaterSurface
                | DeploymentElevationType::Ice
                | DeploymentElevationType::Bridge
                | DeploymentElevationType::Building
                | DeploymentElevationType::Roof
        )
    }
}

/// An elevation a unit may be deployed at.
///
/// Ordering looks at the elevation only, so two options at the same
/// elevation with different types are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElevationOption {
    pub elevation: i32,
    pub kind: DeploymentElevationType,
}

impl ElevationOption {
    pub const fn new(elevation: i32, kind: DeploymentElevationType) -> Self {
        ElevationOption { elevation, kind }
    }

    /// Total order on elevation alone, for stable sorting.
    pub fn cmp_elevation(&self, other: &ElevationOption) -> Ordering {
        self.elevation.cmp(&other.elevation)
    }
}

impl PartialOrd for ElevationOption {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.elevation.cmp(&other.elevation) {
            Ordering::Equal if self.kind != other.kind => None,
            ord => Some(ord),
        }
    }
}

impl std::fmt::Display for ElevationOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {}", self.kind, self.elevation)
    }
}
