//! Error types

use thiserror::Error;

/// Failures that stop the demo before the animation loop starts
#[derive(Error, Debug)]
pub enum InitError {
    #[error("no browser window available")]
    NoWindow,

    #[error("canvas element #{0} not found")]
    NoCanvas(String),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompile { label: &'static str, message: String },
}

/// Matrix operations that have no result
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix is singular (determinant is zero)")]
    Singular,
}

/// Problems reading scene configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bolt_iterations {0} exceeds the supported maximum")]
    TooManyIterations(u32),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}
