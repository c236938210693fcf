/// Render parameters driven by the control sidebar
///
/// This struct holds the four scalars the sliders control. The values are
/// copied verbatim into the shader uniform buffer on every draw, and
/// serialized to JSON so a session can be restored on the next launch.
use serde::{Deserialize, Serialize};

/// Inclusive range of the three color-mix sliders.
pub const COLOR_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Deepest reflection bounce the tracer will follow.
pub const MAX_TRACE_DEPTH: i32 = 8;

/// All parameters forwarded to the ray tracing shader
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Red mix intensity (0.0 to 1.0)
    pub red: f32,

    /// Green mix intensity (0.0 to 1.0)
    pub green: f32,

    /// Blue mix intensity (0.0 to 1.0)
    pub blue: f32,

    /// Reflection trace depth (0 to 8)
    /// - 0 renders primary rays only
    /// - Each extra step allows one more mirror bounce
    pub depth: i32,
}

impl Default for RenderParams {
    /// The startup mix: a cool, blue-heavy image with no reflections
    fn default() -> Self {
        Self {
            red: 0.1,
            green: 0.1,
            blue: 0.9,
            depth: 0,
        }
    }
}

impl RenderParams {
    /// Force every field back into its slider-defined range.
    /// Out-of-range values can only come from a stale or hand-edited
    /// session file; they are clamped rather than rejected.
    pub fn clamped(self) -> Self {
        Self {
            red: self.red.clamp(*COLOR_RANGE.start(), *COLOR_RANGE.end()),
            green: self.green.clamp(*COLOR_RANGE.start(), *COLOR_RANGE.end()),
            blue: self.blue.clamp(*COLOR_RANGE.start(), *COLOR_RANGE.end()),
            depth: self.depth.clamp(0, MAX_TRACE_DEPTH),
        }
    }

    /// Check if all values are at their startup defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Reset all sliders to their startup defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_startup_values() {
        let params = RenderParams::default();
        assert_eq!(params.red, 0.1);
        assert_eq!(params.green, 0.1);
        assert_eq!(params.blue, 0.9);
        assert_eq!(params.depth, 0);
        assert!(params.is_default());
    }

    #[test]
    fn test_clamped_forces_slider_ranges() {
        let params = RenderParams {
            red: -0.5,
            green: 1.5,
            blue: 0.3,
            depth: 99,
        }
        .clamped();

        assert_eq!(params.red, 0.0);
        assert_eq!(params.green, 1.0);
        assert_eq!(params.blue, 0.3);
        assert_eq!(params.depth, MAX_TRACE_DEPTH);

        let negative_depth = RenderParams {
            depth: -3,
            ..RenderParams::default()
        }
        .clamped();
        assert_eq!(negative_depth.depth, 0);
    }

    #[test]
    fn test_clamped_keeps_in_range_values() {
        let params = RenderParams {
            red: 0.4,
            green: 0.6,
            blue: 1.0,
            depth: 5,
        };
        assert_eq!(params.clamped(), params);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut params = RenderParams::default();
        params.red = 0.7;
        params.depth = 3;

        let json = serde_json::to_string(&params).unwrap();
        let restored: RenderParams = serde_json::from_str(&json).unwrap();

        assert_eq!(params, restored);
        assert!(!restored.is_default());
    }

    #[test]
    fn test_reset() {
        let mut params = RenderParams::default();
        params.blue = 0.2;
        params.depth = 4;

        assert!(!params.is_default());

        params.reset();

        assert!(params.is_default());
    }
}
