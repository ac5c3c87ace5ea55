//! Core backend abstraction traits
//!
//! The application only reaches the GPU through [`RenderContext`], which keeps
//! the loop and the viewport logic independent of wgpu.

use crate::backend::types::*;
use crate::scene::{Camera, Scene};
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No graphics backend available (WebGPU: {webgpu}, WebGL2: {webgl2})")]
    NoBackendAvailable { webgpu: bool, webgl2: bool },
    #[error("{0} backend was requested but is not available")]
    Unavailable(BackendKind),
    #[error("No {0} adapter found")]
    AdapterNotFound(BackendKind),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Per-frame render failures. None of them are fatal to the loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Surface lost")]
    SurfaceLost,
    #[error("Surface outdated")]
    SurfaceOutdated,
    #[error("Timed out acquiring the next frame")]
    Timeout,
    #[error("Out of memory")]
    OutOfMemory,
}

/// A renderer bound to one output surface
pub trait RenderContext {
    /// Backend this renderer ended up on
    fn backend(&self) -> BackendKind;

    fn set_clear_color(&mut self, color: Color);

    /// Device pixels per logical pixel; the drawing buffer is `size * ratio`
    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Resize the output surface, in logical pixels
    fn set_size(&mut self, width: u32, height: u32);

    /// Current output size in logical pixels
    fn size(&self) -> (u32, u32);

    /// Draw `scene` as seen through `camera`
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError>;
}
