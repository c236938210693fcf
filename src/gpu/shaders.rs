/// Shader source loading
///
/// The viewer compiles its program from two WGSL files read from a fixed
/// relative directory, so the ray tracer can be edited without rebuilding
/// the host. A missing or unreadable file is fatal at startup; the sources
/// are validated later, when the GPU modules are created.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Directory the shader sources are read from, relative to the working
/// directory the viewer is launched in.
pub const SHADER_DIR: &str = "shaders";

/// Fullscreen pass vertex stage
pub const VERTEX_SHADER_FILE: &str = "raytrace.vert.wgsl";

/// The ray tracer itself
pub const FRAGMENT_SHADER_FILE: &str = "raytrace.frag.wgsl";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The two WGSL sources that make up the shader program
#[derive(Debug, Clone)]
pub struct ShaderSet {
    pub vertex: String,
    pub fragment: String,
    /// Where the fragment source came from, for diagnostics
    pub fragment_path: PathBuf,
}

impl ShaderSet {
    /// Load both stages from the default `shaders/` directory
    pub fn load_default() -> Result<Self, ShaderError> {
        Self::from_dir(Path::new(SHADER_DIR))
    }

    /// Load both stages from an explicit directory
    pub fn from_dir(dir: &Path) -> Result<Self, ShaderError> {
        let vertex_path = dir.join(VERTEX_SHADER_FILE);
        let fragment_path = dir.join(FRAGMENT_SHADER_FILE);

        Ok(Self {
            vertex: read_source(&vertex_path)?,
            fragment: read_source(&fragment_path)?,
            fragment_path,
        })
    }

    /// Replace the fragment stage with a user-picked file, keeping the
    /// stock fullscreen vertex stage
    pub fn with_fragment(mut self, path: &Path) -> Result<Self, ShaderError> {
        self.fragment = read_source(path)?;
        self.fragment_path = path.to_path_buf();
        Ok(self)
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn shipped_shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(SHADER_DIR)
    }

    #[test]
    fn test_shipped_shaders_load() {
        let set = ShaderSet::from_dir(&shipped_shader_dir()).unwrap();

        assert!(set.vertex.contains("fn vs_main"));
        assert!(set.fragment.contains("fn fs_main"));
        assert!(set.fragment_path.ends_with(FRAGMENT_SHADER_FILE));
    }

    #[test]
    fn test_shipped_fragment_declares_host_uniforms() {
        // The uniform block must stay in sync with gpu::uniforms::SceneUniforms
        let set = ShaderSet::from_dir(&shipped_shader_dir()).unwrap();

        for field in [
            "camera_position",
            "camera_up",
            "camera_side",
            "camera_view",
            "light_position",
            "color_mix",
            "viewport_scale",
            "trace_depth",
        ] {
            assert!(
                set.fragment.contains(field),
                "fragment shader is missing uniform field `{field}`"
            );
        }
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();

        let err = ShaderSet::from_dir(dir.path()).unwrap_err();
        let message = err.to_string();

        assert!(message.contains(VERTEX_SHADER_FILE), "got: {message}");
    }

    #[test]
    fn test_with_fragment_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.wgsl");
        let mut file = fs::File::create(&custom).unwrap();
        writeln!(file, "@fragment fn fs_main() {{}}").unwrap();

        let set = ShaderSet::from_dir(&shipped_shader_dir())
            .unwrap()
            .with_fragment(&custom)
            .unwrap();

        assert!(set.fragment.contains("@fragment"));
        assert_eq!(set.fragment_path, custom);
        // The vertex stage is untouched
        assert!(set.vertex.contains("fn vs_main"));
    }

    #[test]
    fn test_with_fragment_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = ShaderSet::from_dir(&shipped_shader_dir())
            .unwrap()
            .with_fragment(&dir.path().join("nope.wgsl"));

        assert!(matches!(result, Err(ShaderError::Read { .. })));
    }
}
