//! Deployment-elevation legality.
//!
//! Given a unit, a hex and its board, answers which elevations or altitudes
//! the unit may be set up at.

pub mod allowed;
pub mod elevation;
pub mod unit;

pub use allowed::{allowed_elevations, AllowedDeploymentHelper, DeploymentError, MAX_ALTITUDE, VTOL_BAND_TOP};
pub use elevation::{DeploymentElevationType, ElevationOption};
pub use unit::{DeployableUnit, MovementMode, NoStacking, StackingRule, UnitProfile};
