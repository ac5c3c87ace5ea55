//! Desktop host
//!
//! Runs the application in a winit window. The window doubles as the
//! container, redraw requests stand in for animation frames.

use std::sync::Arc;

use glam::Vec2;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::app::{App, BootstrapError, Host};
use crate::backend::wgpu_backend::{self, WgpuRenderer};
use crate::backend::{BackendError, BackendKind, BackendProbe, RendererOptions};
use crate::clock::InstantTime;
use crate::config::AppConfig;
use crate::render_loop::FrameScheduler;
use crate::viewport::Container;

/// Pixels per wheel "line"
const PIXELS_PER_LINE: f32 = 100.0;

/// The window's client area
pub struct WindowContainer {
    window: Arc<Window>,
}

impl Container for WindowContainer {
    fn client_size(&self) -> (u32, u32) {
        let size: LogicalSize<u32> = self.window.inner_size().to_logical(self.window.scale_factor());
        (size.width, size.height)
    }
}

/// Schedules the next tick through `Window::request_redraw`
pub struct RedrawScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

pub struct NativeHost {
    window: Arc<Window>,
}

impl NativeHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    fn has_adapter(kind: BackendKind) -> bool {
        let instance = wgpu_backend::create_instance(kind);
        !instance.enumerate_adapters(kind.wgpu_backends()).is_empty()
    }
}

impl Host for NativeHost {
    type Container = WindowContainer;
    type Renderer = WgpuRenderer;
    type Scheduler = RedrawScheduler;
    type Time = InstantTime;

    fn probe(&self) -> BackendProbe {
        BackendProbe::new(
            Self::has_adapter(BackendKind::WebGpu),
            Self::has_adapter(BackendKind::WebGl2),
        )
    }

    fn container(&self, _id: &str) -> Result<WindowContainer, BootstrapError> {
        Ok(WindowContainer {
            window: Arc::clone(&self.window),
        })
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    async fn create_renderer(
        &self,
        container: &WindowContainer,
        options: RendererOptions,
    ) -> Result<WgpuRenderer, BackendError> {
        let instance = wgpu_backend::create_instance(options.backend);
        let surface = instance
            .create_surface(Arc::clone(&container.window))
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;
        WgpuRenderer::new(&instance, surface, options, container.client_size()).await
    }

    fn attach_surface(&self, _container: &WindowContainer) -> Result<(), BootstrapError> {
        // the surface is the window itself
        Ok(())
    }

    fn scheduler(&self) -> RedrawScheduler {
        RedrawScheduler {
            window: Arc::clone(&self.window),
        }
    }

    fn time(&self) -> InstantTime {
        InstantTime::default()
    }
}

/// Open a window and run until it is closed
pub fn run(config: AppConfig) -> Result<(), BootstrapError> {
    let event_loop = EventLoop::new().map_err(|e| BootstrapError::Host(e.to_string()))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(&event_loop)
            .map_err(|e| BootstrapError::Host(e.to_string()))?,
    );

    let host = NativeHost::new(Arc::clone(&window));
    let mut app = pollster::block_on(App::bootstrap(&host, &config))?;
    app.resize()?;
    app.start();

    let mut cursor = Vec2::ZERO;

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            let Event::WindowEvent { event, window_id } = event else {
                return;
            };
            if window_id != window.id() {
                return;
            }

            match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    app.set_pixel_ratio(window.scale_factor());
                    // minimized windows report a zero size
                    if let Err(err) = app.resize() {
                        log::debug!("Resize skipped: {}", err);
                    }
                }
                WindowEvent::RedrawRequested => {
                    app.frame();
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => match state {
                    ElementState::Pressed => app.pointer_down(cursor),
                    ElementState::Released => app.pointer_up(),
                },
                WindowEvent::CursorMoved { position, .. } => {
                    let logical = position.to_logical::<f32>(window.scale_factor());
                    cursor = Vec2::new(logical.x, logical.y);
                    app.pointer_move(cursor);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    // winit reports scrolling away from the user as positive
                    let delta_y = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                    };
                    app.wheel(delta_y);
                }
                _ => {}
            }
        })
        .map_err(|e| BootstrapError::Host(e.to_string()))
}
