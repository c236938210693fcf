/// Uniform state shared with the fragment shader
///
/// The camera and light are fixed for the lifetime of the process; only
/// the color mix, trace depth and viewport scale change between frames.
/// `SceneUniforms` must match the WGSL struct layout with proper alignment.
use bytemuck::{Pod, Zeroable};
use cgmath::{Vector2, Vector3};

use crate::state::params::RenderParams;

/// The fixed demo camera: on the negative Z axis, looking at the origin
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub up: Vector3<f32>,
    pub side: Vector3<f32>,
    pub view: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, -7.5),
            up: Vector3::unit_y(),
            side: Vector3::unit_x(),
            view: Vector3::unit_z(),
        }
    }
}

impl Camera {
    /// Per-axis ray scale that keeps the image square on any viewport:
    /// x stays 1.0, y carries the aspect ratio
    pub fn viewport_scale(viewport: (u32, u32)) -> Vector2<f32> {
        let (width, height) = viewport;
        Vector2::new(1.0, height.max(1) as f32 / width.max(1) as f32)
    }
}

/// The fixed demo point light
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vector3<f32>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vector3::new(2.0, 0.0, -4.0),
        }
    }
}

/// GPU-side uniform block. Field order, padding and total size must match
/// the `SceneUniforms` struct in the fragment shader (vec3 aligns to 16).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SceneUniforms {
    camera_position: [f32; 3],
    _pad0: f32,
    camera_up: [f32; 3],
    _pad1: f32,
    camera_side: [f32; 3],
    _pad2: f32,
    camera_view: [f32; 3],
    _pad3: f32,
    light_position: [f32; 3],
    _pad4: f32,
    color_mix: [f32; 3],
    _pad5: f32,
    viewport_scale: [f32; 2],
    trace_depth: u32,
    _pad6: u32,
}

impl SceneUniforms {
    /// Assemble the per-frame uniform block
    pub fn new(camera: &Camera, light: &Light, params: &RenderParams, viewport: (u32, u32)) -> Self {
        let scale = Camera::viewport_scale(viewport);

        Self {
            camera_position: camera.position.into(),
            _pad0: 0.0,
            camera_up: camera.up.into(),
            _pad1: 0.0,
            camera_side: camera.side.into(),
            _pad2: 0.0,
            camera_view: camera.view.into(),
            _pad3: 0.0,
            light_position: light.position.into(),
            _pad4: 0.0,
            color_mix: [params.red, params.green, params.blue],
            _pad5: 0.0,
            viewport_scale: scale.into(),
            trace_depth: params.depth.max(0) as u32,
            _pad6: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_matches_wgsl_layout() {
        // Five padded vec3s for camera and light, one for the mix, then
        // vec2 + u32 + pad: 7 * 16 = 112 bytes
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 112);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn test_params_are_copied_verbatim() {
        let params = RenderParams {
            red: 0.25,
            green: 0.5,
            blue: 0.75,
            depth: 3,
        };

        let uniforms = SceneUniforms::new(
            &Camera::default(),
            &Light::default(),
            &params,
            (1920, 1080),
        );

        assert_eq!(uniforms.color_mix, [0.25, 0.5, 0.75]);
        assert_eq!(uniforms.trace_depth, 3);
        assert_eq!(uniforms.camera_position, [0.0, 0.0, -7.5]);
        assert_eq!(uniforms.light_position, [2.0, 0.0, -4.0]);
    }

    #[test]
    fn test_negative_depth_uploads_as_zero() {
        let params = RenderParams {
            depth: -2,
            ..RenderParams::default()
        };

        let uniforms =
            SceneUniforms::new(&Camera::default(), &Light::default(), &params, (640, 480));

        assert_eq!(uniforms.trace_depth, 0);
    }

    #[test]
    fn test_viewport_scale_carries_aspect_ratio() {
        let scale = Camera::viewport_scale((1920, 1080));
        assert_eq!(scale, Vector2::new(1.0, 0.5625));

        let square = Camera::viewport_scale((512, 512));
        assert_eq!(square, Vector2::new(1.0, 1.0));
    }

    #[test]
    fn test_zero_viewport_does_not_divide_by_zero() {
        let scale = Camera::viewport_scale((0, 0));
        assert!(scale.y.is_finite());
        assert_eq!(scale, Vector2::new(1.0, 1.0));
    }
}
