/// GPU ray tracing module
///
/// This module owns everything that talks to the GPU:
/// - `shaders.rs` - loading the WGSL sources from disk
/// - `uniforms.rs` - the uniform block shared with the fragment shader
/// - `pipeline.rs` - wgpu device, pipeline and offscreen rendering
///
/// The pipeline draws a single fullscreen triangle; the fragment shader
/// performs the actual ray tracing. Host code never intersects a ray.

pub mod pipeline;
pub mod shaders;
pub mod uniforms;

pub use pipeline::{GpuError, RenderPipeline};
pub use shaders::{ShaderError, ShaderSet};
