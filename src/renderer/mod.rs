//! WebGPU rendering module
//!
//! Draws the background, the lit logo and the active bolt in one pass.

pub mod background_pipeline;
pub mod pipeline;
pub mod vertex;

pub use pipeline::RenderState;
