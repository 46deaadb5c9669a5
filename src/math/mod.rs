//! Transform math
//!
//! A small column-major 4x4 matrix library for the camera/model chain.
//! Vector work elsewhere uses `glam`.

pub mod mat4;

pub use mat4::{Matrix4, invert, normal_matrix, transpose, transpose_in_place};
