//! Orbit Cube - a single rotating cube you can orbit with the mouse
//!
//! The renderer prefers a GPU-compute capable backend (WebGPU) and falls back to
//! WebGL2 when it is missing. The same application object runs in two hosts:
//! - **web**: wasm32 entry point bound to a `#canvas-container` element
//! - **native**: a winit desktop window, mostly useful for debugging the loop
//!
//! # Structure
//! - [`app::App`] bootstraps everything once and owns camera, scene and renderer
//! - [`render_loop::RenderLoop`] is the Idle/Running frame driver
//! - [`viewport::Viewport`] keeps the camera aspect and surface size in sync with
//!   the container

pub mod app;
pub mod backend;
pub mod clock;
pub mod config;
pub mod logging;
pub mod render_loop;
pub mod resources;
pub mod scene;
pub mod viewport;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{App, BootstrapError, Host};
pub use backend::{
    BackendError, BackendKind, BackendPolicy, BackendProbe, Color, RenderContext, RenderError,
    RendererOptions, WgpuRenderer,
};
pub use clock::{Clock, TimeSource};
pub use config::AppConfig;
pub use render_loop::{FrameScheduler, FrameTime, LoopState, RenderLoop};
pub use viewport::{Container, Viewport, ViewportError};
