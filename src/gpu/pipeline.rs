/// wgpu render pipeline for the ray tracing viewer
///
/// This module manages all the wgpu boilerplate:
/// - Device and queue initialization
/// - Uniform buffer for the scene parameters
/// - Shader module creation with captured diagnostics
/// - Render pipeline state
/// - Offscreen draw and readback

// Use wgpu from iced to avoid dependency conflicts
use iced_wgpu::wgpu;
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::shaders::ShaderSet;
use super::uniforms::{Camera, Light, SceneUniforms};
use crate::state::params::RenderParams;

/// Largest offscreen target edge we will allocate
const MAX_TARGET_EDGE: u32 = 8192;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("the {stage} shader failed to compile: {message}")]
    ShaderCompile { stage: &'static str, message: String },

    #[error("the shader program failed to link: {0}")]
    ProgramLink(String),

    #[error("failed to read back the rendered frame: {0}")]
    Readback(String),
}

/// The one shader program of the viewer. Created once at startup and kept
/// for the process lifetime; a custom-shader reload replaces it wholesale.
pub struct RenderPipeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    camera: Camera,
    light: Light,
}

// Manual Debug implementation (wgpu types don't implement Debug)
impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("camera", &self.camera)
            .field("light", &self.light)
            .finish_non_exhaustive()
    }
}

impl RenderPipeline {
    /// Create the pipeline from the given shader sources
    pub async fn new(
        shaders: &ShaderSet,
        params: &RenderParams,
        viewport: (u32, u32),
    ) -> Result<Self, GpuError> {
        // Request wgpu adapter; rendering is offscreen, so no surface
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ray Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let camera = Camera::default();
        let light = Light::default();

        // Create uniform buffer with the startup slider state
        let uniforms = SceneUniforms::new(&camera, &light, params, viewport);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Single uniform binding, visible to the fragment stage only
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Compile both stages. Driver diagnostics surface through the
        // validation error scope; a failure here is fatal for the caller.
        let vertex_module = compile_module(&device, "vertex", &shaders.vertex).await?;
        let fragment_module = compile_module(&device, "fragment", &shaders.fragment).await?;
        log::debug!(
            "compiled shader program (fragment from {})",
            shaders.fragment_path.display()
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ray Viewer Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Linking the stages validates their interface; capture the error
        // instead of letting wgpu panic
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Ray Viewer Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Disable culling for the fullscreen triangle
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });
        if let Some(error) = device.pop_error_scope().await {
            return Err(GpuError::ProgramLink(error.to_string()));
        }

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            uniform_buffer,
            camera,
            light,
        })
    }

    /// Upload the current slider state and viewport scale. The whole
    /// uniform block is rewritten; there is no partial update path.
    pub fn update_uniforms(&self, params: &RenderParams, viewport: (u32, u32)) {
        let uniforms = SceneUniforms::new(&self.camera, &self.light, params, viewport);

        log::debug!(
            "uniforms updated: mix=({:.2}, {:.2}, {:.2}) depth={}",
            params.red,
            params.green,
            params.blue,
            params.depth
        );

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Record the fullscreen draw into an existing encoder
    pub fn render_to_target(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        viewport: (u32, u32),
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Ray Trace Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_viewport(0.0, 0.0, viewport.0 as f32, viewport.1 as f32, 0.0, 1.0);

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1); // Fullscreen triangle
    }

    /// Render at the given resolution and read the frame back as tightly
    /// packed RGBA8 bytes
    pub fn render_to_bytes(&self, width: u32, height: u32) -> Result<Vec<u8>, GpuError> {
        let width = width.clamp(1, MAX_TARGET_EDGE);
        let height = height.clamp(1, MAX_TARGET_EDGE);

        let output_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let output_view = output_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.render_to_target(&mut encoder, &output_view, (width, height));

        // Readback rows must be aligned to 256 bytes
        let bytes_per_row = width * 4;
        let padded_bytes_per_row = (bytes_per_row + 255) & !255;
        let buffer_size = (padded_bytes_per_row * height) as u64;

        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &output_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::Readback("map callback was dropped".into()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let mut output = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            let start = (y * padded_bytes_per_row) as usize;
            let end = start + (width * 4) as usize;
            output.extend_from_slice(&data[start..end]);
        }

        drop(data);
        output_buffer.unmap();
        Ok(output)
    }
}

/// Create one shader module, trading wgpu's validation panic for a
/// captured, logged diagnostic
async fn compile_module(
    device: &wgpu::Device,
    stage: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, GpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    if let Some(error) = device.pop_error_scope().await {
        let message = error.to_string();
        log::error!("{stage} shader diagnostic: {message}");
        return Err(GpuError::ShaderCompile { stage, message });
    }

    Ok(module)
}
