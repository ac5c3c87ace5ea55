//! Backend abstraction layer
//!
//! Capability probing, the selection policy, and the wgpu renderer behind the
//! [`RenderContext`] trait.

pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;
pub use wgpu_backend::WgpuRenderer;
