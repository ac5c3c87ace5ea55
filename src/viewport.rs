//! Viewport sizing
//!
//! Keeps the camera aspect ratio and the renderer's surface size in sync with
//! the container element. Runs once at startup and once per resize event.

use thiserror::Error;

use crate::backend::RenderContext;
use crate::scene::Camera;

/// Anything with a client area the output is laid out in
pub trait Container {
    /// Current client width and height in logical pixels
    fn client_size(&self) -> (u32, u32);
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportError {
    #[error("Container has a degenerate size {width}x{height}")]
    Degenerate { width: u32, height: u32 },
}

/// One measurement of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self, ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::Degenerate { width, height });
        }
        Ok(Self { width, height })
    }

    /// Read the container's current size
    pub fn measure<C: Container + ?Sized>(container: &C) -> Result<Self, ViewportError> {
        let (width, height) = container.client_size();
        Self::new(width, height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Push this size into the camera (recomputing its projection now) and
    /// the renderer
    pub fn apply<R: RenderContext + ?Sized>(&self, camera: &mut Camera, renderer: &mut R) {
        camera.set_aspect(self.aspect());
        camera.update_projection_matrix();
        renderer.set_size(self.width, self.height);
    }
}
