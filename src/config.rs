//! Application configuration

use crate::backend::{BackendPolicy, Color};
use glam::Vec3;

/// Configuration for bootstrapping the demo
///
/// The defaults reproduce the reference scene: a white unit cube lit by one
/// white directional light, seen from three units away through a 60 degree lens.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Id of the host element the output surface is appended to
    pub container_id: String,
    /// Window title (desktop host only)
    pub title: String,
    /// Initial window width in logical pixels (desktop host only)
    pub width: u32,
    /// Initial window height in logical pixels (desktop host only)
    pub height: u32,
    /// How the backend is chosen from the probe results
    pub backend_policy: BackendPolicy,
    /// Request a multisampled surface
    pub antialias: bool,
    /// Enable vsync
    pub vsync: bool,
    pub clear_color: Color,

    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial camera offset along +Z
    pub camera_distance: f32,

    pub light_color: Vec3,
    pub light_intensity: f32,
    pub light_position: Vec3,
    pub ambient_light: Vec3,

    /// Orbit damping factor, `None` disables inertia
    pub orbit_damping: Option<f32>,
    pub orbit_min_distance: f32,
    pub orbit_max_distance: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            container_id: "canvas-container".to_string(),
            title: "Orbit Cube".to_string(),
            width: 1280,
            height: 720,
            backend_policy: BackendPolicy::PreferGpuCompute,
            antialias: true,
            vsync: true,
            clear_color: Color::from_srgb_hex(0x2c3e50),
            fov_degrees: 60.0,
            near: 0.1,
            far: 10.0,
            camera_distance: 3.0,
            light_color: Vec3::ONE,
            light_intensity: 1.0,
            light_position: Vec3::new(-1.0, 2.0, 4.0),
            ambient_light: Vec3::ZERO,
            orbit_damping: Some(0.05),
            orbit_min_distance: 1.0,
            orbit_max_distance: 8.0,
        }
    }
}

impl AppConfig {
    pub fn with_backend_policy(mut self, policy: BackendPolicy) -> Self {
        self.backend_policy = policy;
        self
    }

    pub fn with_container_id(mut self, id: &str) -> Self {
        self.container_id = id.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}
