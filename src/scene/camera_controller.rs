//! Orbit camera controls
//!
//! Rotates the camera around a target point on a sphere.
//! - Primary button drag: orbit around the target
//! - Wheel: dolly in/out (change distance)
//!
//! Input only accumulates a pending delta; [`OrbitControls::update`] applies it.
//! With damping enabled the delta is applied a fraction per update, so `update`
//! has to run every frame even when no input arrives.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use super::Camera;

const EPS: f32 = 1e-6;

/// Spherical coordinates around the orbit target, Y up
///
/// `phi` is the polar angle from +Y, `theta` the azimuth around Y measured
/// from +Z towards +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep away from the poles, where the view direction degenerates
    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

/// Orbit camera controller
pub struct OrbitControls {
    /// Point the camera orbits around and looks at
    pub target: Vec3,
    pub enable_damping: bool,
    /// Fraction of the pending delta applied per update when damping
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    pending_theta: f32,
    pending_phi: f32,
    scale: f32,
    pointer: Option<Vec2>,
    element_height: f32,
}

impl OrbitControls {
    /// Bind to the camera's current target
    pub fn new(camera: &Camera) -> Self {
        Self {
            target: camera.target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            pending_theta: 0.0,
            pending_phi: 0.0,
            scale: 1.0,
            pointer: None,
            element_height: 1.0,
        }
    }

    /// Enable inertia with the given factor, or disable it with `None`
    pub fn with_damping(mut self, factor: Option<f32>) -> Self {
        match factor {
            Some(f) => {
                self.enable_damping = true;
                self.damping_factor = f;
            }
            None => self.enable_damping = false,
        }
        self
    }

    pub fn with_distance_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Height of the element receiving input. A drag across the full height
    /// orbits one full turn.
    pub fn set_element_height(&mut self, height: f32) {
        self.element_height = height.max(1.0);
    }

    pub fn is_rotating(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        self.pointer = Some(position);
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        let Some(last) = self.pointer else {
            return;
        };
        let delta = position - last;
        self.rotate_left(TAU * delta.x / self.element_height * self.rotate_speed);
        self.rotate_up(TAU * delta.y / self.element_height * self.rotate_speed);
        self.pointer = Some(position);
    }

    pub fn pointer_up(&mut self) {
        self.pointer = None;
    }

    /// Wheel input; positive `delta_y` scrolls away from the user (dolly out)
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.scale *= self.zoom_scale();
        } else if delta_y > 0.0 {
            self.scale /= self.zoom_scale();
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.pending_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.pending_phi -= angle;
    }

    /// Apply pending input to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.enable_damping {
            spherical.theta += self.pending_theta * self.damping_factor;
            spherical.phi += self.pending_phi * self.damping_factor;
        } else {
            spherical.theta += self.pending_theta;
            spherical.phi += self.pending_phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        self.scale = 1.0;

        (camera.position - before).length_squared() > EPS
    }
}
