//! Browser host
//!
//! The wasm entry point. On page load it looks up `#canvas-container`, probes
//! WebGPU and WebGL2, bootstraps the [`App`] and wires the animation frame,
//! resize and pointer callbacks. All callbacks share the app through an
//! `Rc<RefCell<_>>`; the browser never nests them, so borrows never overlap.
//!
//! `?backend=webgpu` or `?backend=webgl` in the page URL forces a backend.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, EventTarget, HtmlCanvasElement, HtmlElement, PointerEvent,
    WheelEvent,
};

use crate::app::{App, BootstrapError, Host};
use crate::backend::wgpu_backend::{self, WgpuRenderer};
use crate::backend::{BackendError, BackendPolicy, BackendProbe, RendererOptions};
use crate::clock::TimeSource;
use crate::config::AppConfig;
use crate::logging;
use crate::render_loop::FrameScheduler;
use crate::viewport::Container;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// The host element plus the canvas of the renderer built for it
///
/// A canvas keeps the first context type it hands out, so every renderer
/// attempt gets a fresh one and only the last is kept.
pub struct WebContainer {
    element: HtmlElement,
    canvas: RefCell<Option<HtmlCanvasElement>>,
}

impl Container for WebContainer {
    fn client_size(&self) -> (u32, u32) {
        (
            self.element.client_width().max(0) as u32,
            self.element.client_height().max(0) as u32,
        )
    }
}

/// Schedules ticks with `requestAnimationFrame`
///
/// The callback slot is filled by the launcher once the app exists.
pub struct AnimationFrameScheduler {
    window: web_sys::Window,
    callback: FrameCallback,
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) {
        if let Some(callback) = self.callback.borrow().as_ref() {
            if let Err(err) = self
                .window
                .request_animation_frame(callback.as_ref().unchecked_ref())
            {
                log::error!("requestAnimationFrame failed: {:?}", err);
            }
        }
    }
}

/// `performance.now()` in seconds
pub struct PerformanceTime {
    performance: Option<web_sys::Performance>,
}

impl TimeSource for PerformanceTime {
    fn now(&self) -> f64 {
        match &self.performance {
            Some(performance) => performance.now() / 1000.0,
            None => js_sys::Date::now() / 1000.0,
        }
    }
}

pub struct WebHost {
    window: web_sys::Window,
    document: Document,
    frame_callback: FrameCallback,
}

impl WebHost {
    pub fn new() -> Result<Self, BootstrapError> {
        let window =
            web_sys::window().ok_or_else(|| BootstrapError::Host("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| BootstrapError::Host("no document".into()))?;
        Ok(Self {
            window,
            document,
            frame_callback: Rc::new(RefCell::new(None)),
        })
    }

    fn create_canvas(&self) -> Result<HtmlCanvasElement, BootstrapError> {
        self.document
            .create_element("canvas")
            .map_err(js_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BootstrapError::Host("created element is not a canvas".into()))
    }
}

impl Host for WebHost {
    type Container = WebContainer;
    type Renderer = WgpuRenderer;
    type Scheduler = AnimationFrameScheduler;
    type Time = PerformanceTime;

    /// `navigator.gpu` can exist without an adapter behind it; bootstrap
    /// steps down to WebGL2 when the adapter request comes back empty.
    fn probe(&self) -> BackendProbe {
        let webgpu = js_sys::Reflect::has(&self.window.navigator(), &JsValue::from_str("gpu"))
            .unwrap_or(false);
        // a throwaway canvas; a context type can only be claimed once per canvas
        let webgl2 = self
            .create_canvas()
            .ok()
            .and_then(|canvas| canvas.get_context("webgl2").ok().flatten())
            .is_some();
        BackendProbe::new(webgpu, webgl2)
    }

    fn container(&self, id: &str) -> Result<WebContainer, BootstrapError> {
        let element = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| BootstrapError::ContainerNotFound(id.to_string()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| BootstrapError::Host(format!("#{} is not an HTML element", id)))?;
        Ok(WebContainer {
            element,
            canvas: RefCell::new(None),
        })
    }

    fn pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    async fn create_renderer(
        &self,
        container: &WebContainer,
        options: RendererOptions,
    ) -> Result<WgpuRenderer, BackendError> {
        let canvas = self
            .create_canvas()
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;
        let instance = wgpu_backend::create_instance(options.backend);
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;
        let renderer =
            WgpuRenderer::new(&instance, surface, options, container.client_size()).await?;
        *container.canvas.borrow_mut() = Some(canvas.clone());
        Ok(renderer.with_canvas(canvas))
    }

    fn attach_surface(&self, container: &WebContainer) -> Result<(), BootstrapError> {
        let canvas = container.canvas.borrow();
        let canvas = canvas
            .as_ref()
            .ok_or_else(|| BootstrapError::Host("no renderer canvas to attach".into()))?;
        container.element.append_child(canvas).map_err(js_error)?;
        Ok(())
    }

    fn scheduler(&self) -> AnimationFrameScheduler {
        AnimationFrameScheduler {
            window: self.window.clone(),
            callback: Rc::clone(&self.frame_callback),
        }
    }

    fn time(&self) -> PerformanceTime {
        PerformanceTime {
            performance: self.window.performance(),
        }
    }
}

fn js_error(value: JsValue) -> BootstrapError {
    BootstrapError::Host(format!("{:?}", value))
}

/// Register `closure` on `target` for the lifetime of the page
fn listen<T: ?Sized + WasmClosure>(
    target: &EventTarget,
    event: &str,
    closure: Closure<T>,
    options: Option<&AddEventListenerOptions>,
) -> Result<(), BootstrapError> {
    let callback = closure.as_ref().unchecked_ref();
    match options {
        Some(options) => target
            .add_event_listener_with_callback_and_add_event_listener_options(
                event, callback, options,
            ),
        None => target.add_event_listener_with_callback(event, callback),
    }
    .map_err(js_error)?;
    closure.forget();
    Ok(())
}

type SharedApp = Rc<RefCell<App<WebHost>>>;

fn install_resize_listener(window: &web_sys::Window, app: &SharedApp) -> Result<(), BootstrapError> {
    let app = Rc::clone(app);
    let win = window.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        let mut app = app.borrow_mut();
        app.set_pixel_ratio(win.device_pixel_ratio());
        if let Err(err) = app.resize() {
            log::warn!("Resize skipped: {}", err);
        }
    });
    listen(window, "resize", on_resize, None)
}

fn install_pointer_listeners(app: &SharedApp) -> Result<(), BootstrapError> {
    let element = app.borrow().container().element.clone();
    // keep touch drags from scrolling the page
    let _ = element.style().set_property("touch-action", "none");

    let position = |event: &PointerEvent| Vec2::new(event.client_x() as f32, event.client_y() as f32);

    let on_down = {
        let app = Rc::clone(app);
        let element = element.clone();
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let _ = element.set_pointer_capture(event.pointer_id());
            app.borrow_mut().pointer_down(position(&event));
        })
    };
    listen(&element, "pointerdown", on_down, None)?;

    let on_move = {
        let app = Rc::clone(app);
        Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            app.borrow_mut().pointer_move(position(&event));
        })
    };
    listen(&element, "pointermove", on_move, None)?;

    for name in ["pointerup", "pointercancel"] {
        let app = Rc::clone(app);
        let on_up = Closure::<dyn FnMut(PointerEvent)>::new(move |_event: PointerEvent| {
            app.borrow_mut().pointer_up();
        });
        listen(&element, name, on_up, None)?;
    }

    let on_wheel = {
        let app = Rc::clone(app);
        Closure::<dyn FnMut(WheelEvent)>::new(move |event: WheelEvent| {
            event.prevent_default();
            app.borrow_mut().wheel(event.delta_y() as f32);
        })
    };
    // non-passive so the page does not scroll while zooming
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    listen(&element, "wheel", on_wheel, Some(&options))
}

/// Bootstrap, wire the callbacks, size once and start the loop
async fn launch(config: &AppConfig) -> Result<(), BootstrapError> {
    let host = WebHost::new()?;
    let app = App::bootstrap(&host, config).await?;
    let app: SharedApp = Rc::new(RefCell::new(app));

    let frame_app = Rc::clone(&app);
    *host.frame_callback.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
        frame_app.borrow_mut().frame();
    }));

    install_resize_listener(&host.window, &app)?;
    install_pointer_listeners(&app)?;

    let mut app = app.borrow_mut();
    app.resize()?;
    app.start();
    Ok(())
}

fn policy_from_query(window: &web_sys::Window) -> BackendPolicy {
    let search = window.location().search().unwrap_or_default();
    let Some(value) = web_sys::UrlSearchParams::new_with_str(&search)
        .ok()
        .and_then(|params| params.get("backend"))
    else {
        return BackendPolicy::default();
    };
    value.parse().unwrap_or_else(|err| {
        log::warn!("{}; using auto", err);
        BackendPolicy::default()
    })
}

fn show_fallback(container_id: &str, error: &BootstrapError) {
    let element = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(container_id));
    if let Some(element) = element {
        element.set_text_content(Some(&format!("Unable to start the 3D view: {}", error)));
    }
}

/// Page-load entry point
#[wasm_bindgen(start)]
pub fn run() {
    logging::init(log::Level::Info);

    let mut config = AppConfig::default();
    if let Some(window) = web_sys::window() {
        config.backend_policy = policy_from_query(&window);
    }

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = launch(&config).await {
            log::error!("Failed to start: {}", err);
            show_fallback(&config.container_id, &err);
        }
    });
}
