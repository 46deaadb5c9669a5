//! Procedural geometry
//!
//! - `logo`: the static extruded "V" mesh, built once at startup
//! - `lightning`: jagged bolt polylines, regenerated on every strike

pub mod lightning;
pub mod logo;

pub use lightning::{bolt_point_count, generate_bolt};
pub use logo::generate_logo_mesh;
