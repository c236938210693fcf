/// The control sidebar
///
/// Three color-mix sliders, the trace depth slider, and the session
/// buttons. Every slider change is forwarded as a message that ends in a
/// uniform upload and a redraw.
use iced::widget::{button, column, row, slider, text};
use iced::{Element, Length};

use crate::state::params::{RenderParams, COLOR_RANGE, MAX_TRACE_DEPTH};
use crate::Message;

/// Width reserved for the sidebar, in logical pixels
pub const SIDEBAR_WIDTH: f32 = 300.0;

/// Build the sidebar for the current slider state.
/// The buttons stay disabled until the pipeline is ready.
pub fn view<'a>(params: &RenderParams, status: &'a str, ready: bool) -> Element<'a, Message> {
    let depth_slider = column![
        text(format!("Trace depth: {}", params.depth)).size(14),
        slider(
            0.0..=MAX_TRACE_DEPTH as f32,
            params.depth as f32,
            |value| Message::DepthChanged(value.round() as i32),
        )
        .step(1.0),
    ]
    .spacing(4);

    let buttons = row![
        button("Export PNG").on_press_maybe(ready.then_some(Message::ExportFrame)),
        button("Open Shader…").on_press_maybe(ready.then_some(Message::OpenShader)),
    ]
    .spacing(8);

    column![
        text("Ray Viewer").size(28),
        color_slider("Red", params.red, Message::RedChanged),
        color_slider("Green", params.green, Message::GreenChanged),
        color_slider("Blue", params.blue, Message::BlueChanged),
        depth_slider,
        button("Reset").on_press_maybe((!params.is_default()).then_some(Message::ResetParams)),
        buttons,
        text(status).size(14),
    ]
    .spacing(16)
    .padding(16)
    .width(Length::Fixed(SIDEBAR_WIDTH))
    .into()
}

fn color_slider<'a>(
    label: &'a str,
    value: f32,
    on_change: fn(f32) -> Message,
) -> Element<'a, Message> {
    column![
        text(format!("{label}: {value:.2}")).size(14),
        slider(COLOR_RANGE, value, on_change).step(0.01),
    ]
    .spacing(4)
    .into()
}
