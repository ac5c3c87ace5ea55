//! Application object
//!
//! [`App::bootstrap`] composes everything once: backend probe and selection,
//! renderer, camera, light, cube and orbit controls. The host launcher then
//! wires its resize listener, calls [`App::resize`] once and [`App::start`]s
//! the loop, all in the same turn.

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::backend::{BackendError, BackendProbe, RenderContext, RendererOptions};
use crate::clock::TimeSource;
use crate::config::AppConfig;
use crate::render_loop::{FrameScheduler, FrameTime, LoopState, RenderLoop};
use crate::resources::{Material, Mesh};
use crate::scene::{
    Camera, DirectionalLight, ObjectId, OrbitControls, Projection, RenderObject, Scene,
};
use crate::viewport::{Container, Viewport, ViewportError};

/// Startup failure. Nothing is drawn after one of these.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Container element '#{0}' not found")]
    ContainerNotFound(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error("Host error: {0}")]
    Host(String),
}

/// Platform services the application needs
///
/// Implemented by the browser and desktop hosts, and by fakes in tests.
#[allow(async_fn_in_trait)]
pub trait Host {
    type Container: Container;
    type Renderer: RenderContext;
    type Scheduler: FrameScheduler;
    type Time: TimeSource;

    /// Report which backends could be initialized
    fn probe(&self) -> BackendProbe;

    /// Look up the element the output goes into
    fn container(&self, id: &str) -> Result<Self::Container, BootstrapError>;

    /// Device pixels per logical pixel
    fn pixel_ratio(&self) -> f64;

    /// Build a renderer for `container`; awaits device negotiation
    async fn create_renderer(
        &self,
        container: &Self::Container,
        options: RendererOptions,
    ) -> Result<Self::Renderer, BackendError>;

    /// Make the renderer's output visible inside `container`. Called once.
    fn attach_surface(&self, container: &Self::Container) -> Result<(), BootstrapError>;

    fn scheduler(&self) -> Self::Scheduler;

    fn time(&self) -> Self::Time;
}

/// Everything one frame touches
struct Stage<R> {
    renderer: R,
    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    cube: ObjectId,
    draw_calls: u64,
}

impl<R: RenderContext> Stage<R> {
    /// Loop body: spin the cube, update the orbit, draw
    fn step(&mut self, delta: f32) {
        if let Some(cube) = self.scene.object_mut(self.cube) {
            // 1 rad/s about Y
            cube.transform.rotate_y(delta);
        }

        self.controls.update(&mut self.camera);

        self.draw_calls += 1;
        if let Err(err) = self.renderer.render(&self.scene, &self.camera) {
            log::warn!("Frame skipped: {}", err);
        }
    }
}

/// The running demo
pub struct App<H: Host> {
    container: H::Container,
    stage: Stage<H::Renderer>,
    render_loop: RenderLoop<H::Scheduler, H::Time>,
}

impl<H: Host> App<H> {
    /// Build the renderer and the scene. The loop is left Idle.
    pub async fn bootstrap(host: &H, config: &AppConfig) -> Result<Self, BootstrapError> {
        let probe = host.probe();
        log::info!("WebGPU available: {}", probe.webgpu);
        log::info!("WebGL2 available: {}", probe.webgl2);
        let backend = config.backend_policy.select(&probe)?;

        let container = host.container(&config.container_id)?;

        let options = RendererOptions {
            backend,
            antialias: config.antialias,
            vsync: config.vsync,
        };
        let mut renderer = match host.create_renderer(&container, options).await {
            Err(BackendError::AdapterNotFound(failed)) => {
                let Some(backend) = config.backend_policy.fallback_after(failed, &probe) else {
                    return Err(BackendError::AdapterNotFound(failed).into());
                };
                log::warn!("No {} adapter found, falling back to {}", failed, backend);
                host.create_renderer(&container, RendererOptions { backend, ..options })
                    .await?
            }
            result => result?,
        };
        log::info!(
            "Using {} backend ({:?})",
            renderer.backend(),
            config.backend_policy
        );
        renderer.set_clear_color(config.clear_color);
        renderer.set_pixel_ratio(host.pixel_ratio());

        host.attach_surface(&container)?;

        let viewport = Viewport::measure(&container)?;
        let mut camera = Camera::perspective(Projection::perspective(
            config.fov_degrees,
            viewport.aspect(),
            config.near,
            config.far,
        ));
        camera.set_position(Vec3::new(0.0, 0.0, config.camera_distance));
        camera.look_at(Vec3::ZERO);

        let mut scene = Scene::new();
        scene.ambient_light = config.ambient_light;
        scene.add_directional_light(
            DirectionalLight::new(config.light_color, config.light_intensity)
                .with_position(config.light_position),
        );
        let mesh = scene.add_mesh(Mesh::cube());
        let material = scene.add_material(Material::standard());
        let cube = scene.add_object(RenderObject::new(mesh, material));

        let mut controls = OrbitControls::new(&camera)
            .with_damping(config.orbit_damping)
            .with_distance_range(config.orbit_min_distance, config.orbit_max_distance);
        controls.set_element_height(viewport.height as f32);

        log::info!(
            "Scene ready: {} objects, {} lights",
            scene.objects.len(),
            scene.lights.len()
        );

        Ok(Self {
            container,
            stage: Stage {
                renderer,
                scene,
                camera,
                controls,
                cube,
                draw_calls: 0,
            },
            render_loop: RenderLoop::new(host.scheduler(), host.time()),
        })
    }

    /// Re-measure the container and push the size into camera and renderer
    ///
    /// A degenerate container leaves both untouched.
    pub fn resize(&mut self) -> Result<Viewport, ViewportError> {
        let viewport = Viewport::measure(&self.container)?;
        let stage = &mut self.stage;
        viewport.apply(&mut stage.camera, &mut stage.renderer);
        stage.controls.set_element_height(viewport.height as f32);
        log::debug!(
            "Viewport {}x{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            viewport.aspect()
        );
        Ok(viewport)
    }

    /// Start the render loop. Returns false if it was already running.
    pub fn start(&mut self) -> bool {
        let started = self.render_loop.start();
        if started {
            log::info!("Starting render loop");
        }
        started
    }

    /// Scheduled tick. Does nothing until [`App::start`].
    pub fn frame(&mut self) -> Option<FrameTime> {
        let stage = &mut self.stage;
        let time = self.render_loop.tick(|time| stage.step(time.delta))?;

        match time.frame_index {
            0 => log::info!("First frame rendered"),
            59 => log::info!("Render loop running smoothly (60 frames)"),
            _ => {}
        }
        Some(time)
    }

    /// Run the loop body once with an explicit delta, bypassing the scheduler
    /// and clock
    pub fn step(&mut self, delta: f32) {
        self.stage.step(delta);
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.stage.renderer.set_pixel_ratio(ratio);
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        self.stage.controls.pointer_down(position);
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        self.stage.controls.pointer_move(position);
    }

    pub fn pointer_up(&mut self) {
        self.stage.controls.pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.stage.controls.wheel(delta_y);
    }

    pub fn container(&self) -> &H::Container {
        &self.container
    }

    pub fn renderer(&self) -> &H::Renderer {
        &self.stage.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.stage.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.stage.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.stage.controls
    }

    pub fn cube(&self) -> ObjectId {
        self.stage.cube
    }

    /// Current Y rotation of the cube in radians, within [0, 2π)
    pub fn cube_rotation(&self) -> f32 {
        self.stage
            .scene
            .object(self.stage.cube)
            .map(|cube| cube.transform.rotation.y)
            .unwrap_or_default()
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn render_loop(&self) -> &RenderLoop<H::Scheduler, H::Time> {
        &self.render_loop
    }

    /// Number of draw calls issued so far
    pub fn draw_calls(&self) -> u64 {
        self.stage.draw_calls
    }
}
