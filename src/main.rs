use std::path::PathBuf;
use std::sync::Arc;

use iced::widget::image::Handle;
use iced::widget::row;
use iced::{Element, Size, Subscription, Task, Theme};
use rfd::FileDialog;

mod gpu;
mod state;
mod ui;

use gpu::{RenderPipeline, ShaderSet};
use state::params::RenderParams;
use state::session::SessionStore;

/// Export renders at twice the viewport resolution
const EXPORT_SCALE: u32 = 2;

/// Main application state
struct RayViewer {
    /// The slider state forwarded to the shader
    params: RenderParams,
    /// Persists the slider state between launches
    session: SessionStore,
    /// The one shader program; None until compilation finishes
    pipeline: Option<Arc<RenderPipeline>>,
    /// Latest offscreen frame, shown by the viewport widget
    frame: Option<Handle>,
    /// Offscreen render resolution, derived from the window size
    viewport: (u32, u32),
    /// Status message to display to the user
    status: String,
    /// At most one render runs at a time; changes arriving mid-render
    /// set the pending flag and re-render once the frame lands
    render_in_flight: bool,
    render_pending: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Startup compilation finished; failure here is fatal
    PipelineReady(Result<Arc<RenderPipeline>, String>),
    /// A custom-shader rebuild finished; failure keeps the old program
    PipelineRebuilt(Result<Arc<RenderPipeline>, String>),
    /// An offscreen render finished
    FrameReady(Result<Handle, String>),
    /// Slider callbacks
    RedChanged(f32),
    GreenChanged(f32),
    BlueChanged(f32),
    DepthChanged(i32),
    /// User clicked the "Reset" button
    ResetParams,
    /// The window (and with it the viewport) changed size
    WindowResized(Size),
    /// User clicked the "Export PNG" button
    ExportFrame,
    /// Background export completed
    ExportComplete(Result<String, String>),
    /// User clicked the "Open Shader…" button
    OpenShader,
}

impl RayViewer {
    /// Create a new instance and start compiling the shader program
    fn new() -> (Self, Task<Message>) {
        let session = SessionStore::new();
        let params = session.load_or_default();
        let viewport = ui::viewport::render_size(1180.0, 760.0);

        log::info!("starting with {params:?}");

        let viewer = RayViewer {
            params,
            session,
            pipeline: None,
            frame: None,
            viewport,
            status: String::from("Compiling shaders…"),
            render_in_flight: false,
            render_pending: false,
        };

        log::debug!("session file: {}", viewer.session.path().display());

        let build = Task::perform(
            build_pipeline(None, params, viewport),
            Message::PipelineReady,
        );

        (viewer, build)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PipelineReady(Ok(pipeline)) => {
                self.pipeline = Some(pipeline);
                self.status = String::from("Ready.");
                self.request_render()
            }
            Message::PipelineReady(Err(message)) => {
                log::error!("fatal: {message}");
                iced::exit()
            }
            Message::PipelineRebuilt(Ok(pipeline)) => {
                self.pipeline = Some(pipeline);
                self.status = String::from("Custom shader loaded.");
                self.request_render()
            }
            Message::PipelineRebuilt(Err(message)) => {
                log::warn!("keeping previous shader program: {message}");
                self.status = message;
                Task::none()
            }
            Message::FrameReady(Ok(handle)) => {
                self.frame = Some(handle);
                self.render_in_flight = false;
                if self.render_pending {
                    self.render_pending = false;
                    self.request_render()
                } else {
                    Task::none()
                }
            }
            Message::FrameReady(Err(message)) => {
                log::error!("render failed: {message}");
                self.status = message;
                self.render_in_flight = false;
                self.render_pending = false;
                Task::none()
            }
            Message::RedChanged(value) => {
                self.params.red = value;
                self.params_changed()
            }
            Message::GreenChanged(value) => {
                self.params.green = value;
                self.params_changed()
            }
            Message::BlueChanged(value) => {
                self.params.blue = value;
                self.params_changed()
            }
            Message::DepthChanged(value) => {
                self.params.depth = value;
                self.params_changed()
            }
            Message::ResetParams => {
                self.params.reset();
                self.params_changed()
            }
            Message::WindowResized(size) => {
                self.viewport = ui::viewport::render_size(size.width, size.height);
                self.request_render()
            }
            Message::ExportFrame => self.export_frame(),
            Message::ExportComplete(Ok(message)) => {
                log::info!("{message}");
                self.status = message;
                Task::none()
            }
            Message::ExportComplete(Err(message)) => {
                log::error!("export failed: {message}");
                self.status = message;
                Task::none()
            }
            Message::OpenShader => self.open_shader(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        row![
            ui::viewport::view(self.frame.as_ref()),
            ui::controls::view(&self.params, &self.status, self.pipeline.is_some()),
        ]
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Watch for window resizes so the offscreen target can follow
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::Resized(size)) => {
                Some(Message::WindowResized(size))
            }
            _ => None,
        })
    }

    /// Persist the slider state and redraw
    fn params_changed(&mut self) -> Task<Message> {
        if let Err(e) = self.session.save(&self.params) {
            log::warn!("failed to save session: {e}");
        }
        self.request_render()
    }

    /// Upload the uniforms and kick one background render
    fn request_render(&mut self) -> Task<Message> {
        let Some(pipeline) = &self.pipeline else {
            return Task::none();
        };

        if self.render_in_flight {
            self.render_pending = true;
            return Task::none();
        }
        self.render_in_flight = true;

        pipeline.update_uniforms(&self.params, self.viewport);

        let pipeline = Arc::clone(pipeline);
        let (width, height) = self.viewport;
        Task::perform(render_frame(pipeline, width, height), Message::FrameReady)
    }

    /// Ask for a target path and export the current frame as PNG
    fn export_frame(&mut self) -> Task<Message> {
        let Some(pipeline) = &self.pipeline else {
            return Task::none();
        };

        let Some(path) = FileDialog::new()
            .set_title("Export Rendered Frame")
            .add_filter("PNG image", &["png"])
            .set_file_name("raytrace.png")
            .save_file()
        else {
            return Task::none();
        };

        self.status = format!("Exporting {}…", path.display());

        let pipeline = Arc::clone(pipeline);
        let width = self.viewport.0 * EXPORT_SCALE;
        let height = self.viewport.1 * EXPORT_SCALE;
        Task::perform(
            export_frame_async(pipeline, path, width, height),
            Message::ExportComplete,
        )
    }

    /// Pick a replacement fragment shader and rebuild the program.
    /// The stock fullscreen vertex stage is kept.
    fn open_shader(&mut self) -> Task<Message> {
        let Some(path) = FileDialog::new()
            .set_title("Open Fragment Shader")
            .add_filter("WGSL shader", &["wgsl"])
            .pick_file()
        else {
            return Task::none();
        };

        self.status = format!("Compiling {}…", path.display());

        Task::perform(
            build_pipeline(Some(path), self.params, self.viewport),
            Message::PipelineRebuilt,
        )
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Ray Viewer", RayViewer::update, RayViewer::view)
        .theme(RayViewer::theme)
        .subscription(RayViewer::subscription)
        .window_size(Size::new(1180.0, 760.0))
        .centered()
        .run_with(RayViewer::new)
}

/// Load the shader sources and build the render pipeline
async fn build_pipeline(
    fragment_override: Option<PathBuf>,
    params: RenderParams,
    viewport: (u32, u32),
) -> Result<Arc<RenderPipeline>, String> {
    let shaders = tokio::task::spawn_blocking(move || {
        let set = ShaderSet::load_default()?;
        match fragment_override {
            Some(path) => set.with_fragment(&path),
            None => Ok(set),
        }
    })
    .await
    .map_err(|e| format!("Shader load task failed: {e}"))?
    .map_err(|e| e.to_string())?;

    let pipeline = RenderPipeline::new(&shaders, &params, viewport)
        .await
        .map_err(|e| e.to_string())?;

    Ok(Arc::new(pipeline))
}

/// Render one frame off the UI thread and hand it to the image widget
async fn render_frame(
    pipeline: Arc<RenderPipeline>,
    width: u32,
    height: u32,
) -> Result<Handle, String> {
    tokio::task::spawn_blocking(move || {
        let pixels = pipeline
            .render_to_bytes(width, height)
            .map_err(|e| e.to_string())?;
        Ok(Handle::from_rgba(width, height, pixels))
    })
    .await
    .map_err(|e| format!("Render task failed: {e}"))?
}

/// Render at export resolution and write a PNG
async fn export_frame_async(
    pipeline: Arc<RenderPipeline>,
    path: PathBuf,
    width: u32,
    height: u32,
) -> Result<String, String> {
    tokio::task::spawn_blocking(move || {
        let pixels = pipeline
            .render_to_bytes(width, height)
            .map_err(|e| e.to_string())?;

        let frame = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| String::from("rendered frame had an unexpected size"))?;

        frame
            .save(&path)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

        Ok(format!("Exported {}", path.display()))
    })
    .await
    .map_err(|e| format!("Export task failed: {e}"))?
}
