//! Hex-grid tactical board library.
//!
//! Exposes the board model with its automatic terrain and structures, the
//! deployment-elevation query, and board file persistence for use by
//! integration tests and the binary entry point.

pub mod board;
pub mod deploy;
pub mod protocol;
