//! wgpu renderer
//!
//! One renderer per output surface. GPU copies of the scene's meshes,
//! materials and objects are created lazily the first time a frame sees them;
//! their uniforms are rewritten every frame.

mod shader;

pub use shader::MESH_SHADER;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::resources::{MaterialUniformData, Mesh, Vertex};
use crate::scene::{Camera, GpuLightData, Scene, TransformUniformData};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;

/// Instance restricted to the backends that implement `kind`
pub fn create_instance(kind: BackendKind) -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: kind.wgpu_backends(),
        ..Default::default()
    })
}

/// Per-frame uniform, see `FrameUniform` in [`MESH_SHADER`]
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniform {
    view_proj: Mat4,
    camera_position: Vec4,
    light_direction: Vec4,
    light_color: Vec4,
    ambient: Vec4,
    flags: Vec4,
}

impl FrameUniform {
    fn new(scene: &Scene, camera: &Camera, encode_srgb: bool) -> Self {
        let camera = camera.uniform_data();
        let light = scene
            .directional_light()
            .map(|light| light.to_gpu_data())
            .unwrap_or_else(GpuLightData::zeroed);
        Self {
            view_proj: camera.view_proj,
            camera_position: camera.position,
            light_direction: light.direction,
            light_color: light.color_intensity,
            ambient: scene.ambient_light.extend(0.0),
            flags: Vec4::new(if encode_srgb { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0),
        }
    }
}

/// GPU resources for a mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", mesh.name)),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", mesh.name)),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
        }
    }
}

/// A uniform buffer and the bind group exposing it
struct GpuUniform {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuUniform {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, size: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Renderer drawing a [`Scene`] into one wgpu surface
pub struct WgpuRenderer {
    backend: BackendKind,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    /// Surface format is linear, the shader encodes sRGB itself
    encode_srgb: bool,
    sample_count: u32,

    clear_color: Color,
    pixel_ratio: f64,
    /// Logical size, before the pixel ratio
    size: (u32, u32),

    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    frame_uniform: GpuUniform,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,

    gpu_meshes: Vec<GpuMesh>,
    gpu_materials: Vec<GpuUniform>,
    gpu_objects: Vec<GpuUniform>,

    #[cfg(target_arch = "wasm32")]
    canvas: Option<web_sys::HtmlCanvasElement>,
}

impl WgpuRenderer {
    /// Negotiate adapter and device for `surface` and build the pipeline
    ///
    /// This is the only await point of startup; on the web it resolves once
    /// the browser hands out the device.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        options: RendererOptions,
        initial_size: (u32, u32),
    ) -> BackendResult<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(BackendError::AdapterNotFound(options.backend))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Found adapter: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Orbit Cube Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: options.backend.limits().using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        log::info!(
            "Device created with max texture size: {}",
            device.limits().max_texture_dimension_2d
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                BackendError::SurfaceCreationFailed("surface is not supported by the adapter".into())
            })?;
        let encode_srgb = !surface_format.is_srgb();

        let sample_count = if options.antialias
            && adapter
                .get_texture_format_features(surface_format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };
        log::info!(
            "Surface format {:?} ({}), {}x MSAA",
            surface_format,
            if encode_srgb { "shader sRGB encode" } else { "sRGB" },
            sample_count
        );

        let present_mode = if options.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let size = (initial_size.0.max(1), initial_size.1.max(1));
        let (width, height) =
            drawing_buffer_size(size, 1.0, device.limits().max_texture_dimension_2d);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let frame_layout = uniform_layout(
            &device,
            "Frame Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let object_layout = uniform_layout(&device, "Object Layout", wgpu::ShaderStages::VERTEX);
        let material_layout =
            uniform_layout(&device, "Material Layout", wgpu::ShaderStages::FRAGMENT);

        let pipeline = create_pipeline(
            &device,
            surface_format,
            sample_count,
            &[&frame_layout, &object_layout, &material_layout],
        );

        let frame_uniform = GpuUniform::new(
            &device,
            &frame_layout,
            "Frame Uniform",
            std::mem::size_of::<FrameUniform>(),
        );
        let (depth_view, msaa_view) = create_attachments(&device, &surface_config, sample_count);

        Ok(Self {
            backend: options.backend,
            surface,
            device,
            queue,
            surface_config,
            encode_srgb,
            sample_count,
            clear_color: Color::BLACK,
            pixel_ratio: 1.0,
            size,
            pipeline,
            object_layout,
            material_layout,
            frame_uniform,
            depth_view,
            msaa_view,
            gpu_meshes: Vec::new(),
            gpu_materials: Vec::new(),
            gpu_objects: Vec::new(),
            #[cfg(target_arch = "wasm32")]
            canvas: None,
        })
    }

    /// Keep the canvas' backing store and CSS size in step with the surface
    #[cfg(target_arch = "wasm32")]
    pub fn with_canvas(mut self, canvas: web_sys::HtmlCanvasElement) -> Self {
        self.canvas = Some(canvas);
        self.reconfigure();
        self
    }

    fn reconfigure(&mut self) {
        let max_size = self.device.limits().max_texture_dimension_2d;
        let (width, height) = drawing_buffer_size(self.size, self.pixel_ratio, max_size);

        #[cfg(target_arch = "wasm32")]
        if let Some(canvas) = &self.canvas {
            canvas.set_width(width);
            canvas.set_height(height);
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", self.size.0));
            let _ = style.set_property("height", &format!("{}px", self.size.1));
            let _ = style.set_property("display", "block");
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        let (depth_view, msaa_view) =
            create_attachments(&self.device, &self.surface_config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;

        log::debug!(
            "Surface configured: {}x{} (logical {}x{}, ratio {})",
            width,
            height,
            self.size.0,
            self.size.1,
            self.pixel_ratio
        );
    }

    /// Create GPU copies of anything added to the scene since the last frame
    fn sync_scene(&mut self, scene: &Scene) {
        for mesh in scene.meshes.iter().skip(self.gpu_meshes.len()) {
            self.gpu_meshes.push(GpuMesh::new(&self.device, mesh));
        }
        while self.gpu_materials.len() < scene.materials.len() {
            self.gpu_materials.push(GpuUniform::new(
                &self.device,
                &self.material_layout,
                "Material Uniform",
                std::mem::size_of::<MaterialUniformData>(),
            ));
        }
        while self.gpu_objects.len() < scene.objects.len() {
            self.gpu_objects.push(GpuUniform::new(
                &self.device,
                &self.object_layout,
                "Object Uniform",
                std::mem::size_of::<TransformUniformData>(),
            ));
        }
    }

    /// Reconfigure after a failed acquire; the frame is dropped
    fn recover(&mut self, error: wgpu::SurfaceError) -> RenderError {
        match error {
            wgpu::SurfaceError::Lost => {
                self.surface.configure(&self.device, &self.surface_config);
                RenderError::SurfaceLost
            }
            wgpu::SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.surface_config);
                RenderError::SurfaceOutdated
            }
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
        }
    }
}

impl RenderContext for WgpuRenderer {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        if ratio != self.pixel_ratio {
            self.pixel_ratio = ratio;
            self.reconfigure();
        }
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.reconfigure();
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        self.sync_scene(scene);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(error) => return Err(self.recover(error)),
        };

        let frame_data = FrameUniform::new(scene, camera, self.encode_srgb);
        self.queue
            .write_buffer(&self.frame_uniform.buffer, 0, bytemuck::bytes_of(&frame_data));
        for (material, gpu) in scene.materials.iter().zip(&self.gpu_materials) {
            self.queue
                .write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&material.uniform_data()));
        }
        for (object, gpu) in scene.objects.iter().zip(&self.gpu_objects) {
            let data = object.transform.uniform_data();
            self.queue.write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(&data));
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu(self.encode_srgb)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_uniform.bind_group, &[]);

            for (object, gpu_object) in scene.objects.iter().zip(&self.gpu_objects) {
                let (Some(mesh), Some(material)) = (
                    self.gpu_meshes.get(object.mesh_id),
                    self.gpu_materials.get(object.material_id),
                ) else {
                    continue;
                };
                pass.set_bind_group(1, &gpu_object.bind_group, &[]);
                pass.set_bind_group(2, &material.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Logical size times pixel ratio, scaled down to fit `max_dimension` on both
/// axes while keeping the aspect ratio
fn drawing_buffer_size(size: (u32, u32), pixel_ratio: f64, max_dimension: u32) -> (u32, u32) {
    let width = (size.0 as f64 * pixel_ratio).round().max(1.0);
    let height = (size.1 as f64 * pixel_ratio).round().max(1.0);
    let max_size = max_dimension as f64;

    if width > max_size || height > max_size {
        let scale = (max_size / width).min(max_size / height);
        (
            ((width * scale) as u32).max(1),
            ((height * scale) as u32).max(1),
        )
    } else {
        (width as u32, height as u32)
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    sample_count: u32,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: "vs_main",
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Depth buffer plus, when multisampling, the color target that resolves into
/// the surface texture
fn create_attachments(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
    let size = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    let msaa = (sample_count > 1).then(|| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("MSAA Color"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    });

    (
        depth.create_view(&wgpu::TextureViewDescriptor::default()),
        msaa,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DirectionalLight, Projection};
    use glam::Vec3;

    #[test]
    fn drawing_buffer_scales_by_pixel_ratio() {
        assert_eq!(drawing_buffer_size((800, 600), 2.0, 8192), (1600, 1200));
        assert_eq!(drawing_buffer_size((801, 601), 1.5, 8192), (1202, 902));
    }

    #[test]
    fn drawing_buffer_is_clamped_keeping_aspect() {
        assert_eq!(drawing_buffer_size((4096, 2048), 2.0, 4096), (4096, 2048));
        assert_eq!(drawing_buffer_size((1024, 8192), 1.0, 4096), (512, 4096));
    }

    #[test]
    fn drawing_buffer_never_collapses() {
        assert_eq!(drawing_buffer_size((0, 0), 1.0, 2048), (1, 1));
        assert_eq!(drawing_buffer_size((1, 1), 0.25, 2048), (1, 1));
    }

    #[test]
    fn frame_uniform_carries_light_and_output_flag() {
        let mut scene = Scene::new();
        scene.add_directional_light(
            DirectionalLight::new(Vec3::ONE, 2.0).with_position(Vec3::new(0.0, 0.0, 5.0)),
        );
        let camera = Camera::perspective(Projection::perspective(60.0, 1.0, 0.1, 10.0));

        let data = FrameUniform::new(&scene, &camera, true);
        assert_eq!(data.light_direction, Vec4::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(data.light_color, Vec4::new(1.0, 1.0, 1.0, 2.0));
        assert_eq!(data.flags.x, 1.0);
        assert_eq!(data.view_proj, camera.view_projection_matrix());

        let unlit = FrameUniform::new(&Scene::new(), &camera, false);
        assert_eq!(unlit.light_color, Vec4::ZERO);
        assert_eq!(unlit.flags.x, 0.0);
    }
}
