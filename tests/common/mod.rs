//! Shared fakes for driving `App` without a browser or a GPU.
//!
//! The fake host hands out a container whose size the test controls, a
//! renderer that records what it was told, a scheduler that counts frame
//! requests, and a clock the test advances by hand.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use orbit_cube::scene::{Camera, Scene};
use orbit_cube::{
    App, AppConfig, BackendError, BackendKind, BackendProbe, BootstrapError, Color, Container,
    FrameScheduler, Host, RenderContext, RenderError, RendererOptions, TimeSource,
};

// ============================================================================
// Container
// ============================================================================

/// Container with a size shared with the test
#[derive(Clone, Default)]
pub struct FakeContainer {
    size: Rc<Cell<(u32, u32)>>,
}

impl FakeContainer {
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Container for FakeContainer {
    fn client_size(&self) -> (u32, u32) {
        self.size.get()
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Counters shared between a host and the renderer it created
#[derive(Clone, Default)]
pub struct RenderStats {
    pub draws: Rc<Cell<u32>>,
    /// Renderer constructions attempted, successful or not
    pub renderer_requests: Rc<Cell<u32>>,
    pub frame_requests: Rc<Cell<u32>>,
    pub attachments: Rc<Cell<u32>>,
}

pub struct FakeRenderer {
    pub backend: BackendKind,
    pub options: RendererOptions,
    pub clear_color: Option<Color>,
    pub pixel_ratio: f64,
    pub size: (u32, u32),
    pub set_size_calls: u32,
    /// Cube Y rotation seen by each draw
    pub drawn_rotations: Vec<f32>,
    pub fail_renders: bool,
    stats: RenderStats,
}

impl RenderContext for FakeRenderer {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = Some(color);
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.set_size_calls += 1;
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, scene: &Scene, _camera: &Camera) -> Result<(), RenderError> {
        self.stats.draws.set(self.stats.draws.get() + 1);
        self.drawn_rotations
            .push(scene.objects.first().map_or(0.0, |o| o.transform.rotation.y));
        if self.fail_renders {
            Err(RenderError::SurfaceLost)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Scheduler and time
// ============================================================================

pub struct FakeScheduler {
    requests: Rc<Cell<u32>>,
}

impl FrameScheduler for FakeScheduler {
    fn request_frame(&mut self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// Clock the test moves by hand, in seconds
#[derive(Clone, Default)]
pub struct ManualTime(Rc<Cell<f64>>);

impl ManualTime {
    pub fn advance(&self, seconds: f64) {
        self.0.set(self.0.get() + seconds);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

// ============================================================================
// Host
// ============================================================================

pub struct FakeHost {
    pub probe: BackendProbe,
    pub container: FakeContainer,
    pub container_id: String,
    pub pixel_ratio: f64,
    /// Reject device negotiation
    pub fail_device: bool,
    /// An adapter answers WebGPU requests (the probe may say yes regardless)
    pub webgpu_adapter: bool,
    /// Renderers report a lost surface on every draw
    pub fail_renders: bool,
    pub time: ManualTime,
    pub stats: RenderStats,
}

impl FakeHost {
    pub fn new(width: u32, height: u32) -> Self {
        let container = FakeContainer::default();
        container.set_size(width, height);
        Self {
            probe: BackendProbe::new(true, true),
            container,
            container_id: AppConfig::default().container_id,
            pixel_ratio: 1.0,
            fail_device: false,
            webgpu_adapter: true,
            fail_renders: false,
            time: ManualTime::default(),
            stats: RenderStats::default(),
        }
    }

    pub fn with_probe(mut self, webgpu: bool, webgl2: bool) -> Self {
        self.probe = BackendProbe::new(webgpu, webgl2);
        self
    }

    pub fn failing_device(mut self) -> Self {
        self.fail_device = true;
        self
    }

    pub fn without_webgpu_adapter(mut self) -> Self {
        self.webgpu_adapter = false;
        self
    }

    pub fn draws(&self) -> u32 {
        self.stats.draws.get()
    }

    pub fn frame_requests(&self) -> u32 {
        self.stats.frame_requests.get()
    }
}

impl Host for FakeHost {
    type Container = FakeContainer;
    type Renderer = FakeRenderer;
    type Scheduler = FakeScheduler;
    type Time = ManualTime;

    fn probe(&self) -> BackendProbe {
        self.probe
    }

    fn container(&self, id: &str) -> Result<FakeContainer, BootstrapError> {
        if id == self.container_id {
            Ok(self.container.clone())
        } else {
            Err(BootstrapError::ContainerNotFound(id.to_string()))
        }
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    async fn create_renderer(
        &self,
        _container: &FakeContainer,
        options: RendererOptions,
    ) -> Result<FakeRenderer, BackendError> {
        let requests = &self.stats.renderer_requests;
        requests.set(requests.get() + 1);
        if options.backend == BackendKind::WebGpu && !self.webgpu_adapter {
            return Err(BackendError::AdapterNotFound(BackendKind::WebGpu));
        }
        if self.fail_device {
            return Err(BackendError::DeviceCreationFailed(
                "device request rejected".into(),
            ));
        }
        Ok(FakeRenderer {
            backend: options.backend,
            options,
            clear_color: None,
            pixel_ratio: 1.0,
            size: (0, 0),
            set_size_calls: 0,
            drawn_rotations: Vec::new(),
            fail_renders: self.fail_renders,
            stats: self.stats.clone(),
        })
    }

    fn attach_surface(&self, _container: &FakeContainer) -> Result<(), BootstrapError> {
        let attachments = &self.stats.attachments;
        attachments.set(attachments.get() + 1);
        Ok(())
    }

    fn scheduler(&self) -> FakeScheduler {
        FakeScheduler {
            requests: Rc::clone(&self.stats.frame_requests),
        }
    }

    fn time(&self) -> ManualTime {
        self.time.clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn bootstrap(host: &FakeHost) -> Result<App<FakeHost>, BootstrapError> {
    bootstrap_with(host, &AppConfig::default())
}

pub fn bootstrap_with(
    host: &FakeHost,
    config: &AppConfig,
) -> Result<App<FakeHost>, BootstrapError> {
    pollster::block_on(App::bootstrap(host, config))
}

/// Bootstrap, size once and start the loop, the way the hosts launch
pub fn launch(host: &FakeHost) -> App<FakeHost> {
    let mut app = bootstrap(host).expect("bootstrap");
    app.resize().expect("initial resize");
    assert!(app.start());
    app
}
