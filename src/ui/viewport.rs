/// The rendered-frame viewport
///
/// Displays the latest offscreen frame through an image widget, and owns
/// the rule for picking the offscreen resolution from the window size.
use iced::widget::{container, image, text};
use iced::{ContentFit, Element, Length};

use crate::Message;

use super::controls::SIDEBAR_WIDTH;

/// Interactive renders are capped at this width so slider drags stay
/// cheap; exports render wider.
pub const MAX_RENDER_WIDTH: u32 = 1920;

/// Show the latest frame, or a placeholder while shaders compile
pub fn view(frame: Option<&image::Handle>) -> Element<'static, Message> {
    let content: Element<'static, Message> = match frame {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text("Compiling shaders…").size(18).into(),
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Offscreen resolution for a given window size: the area left of the
/// sidebar, shrunk uniformly until it fits under MAX_RENDER_WIDTH.
pub fn render_size(window_width: f32, window_height: f32) -> (u32, u32) {
    let mut width = (window_width - SIDEBAR_WIDTH).max(1.0);
    let mut height = window_height.max(1.0);

    if width > MAX_RENDER_WIDTH as f32 {
        height = height * MAX_RENDER_WIDTH as f32 / width;
        width = MAX_RENDER_WIDTH as f32;
    }

    ((width as u32).max(1), (height as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_size_subtracts_sidebar() {
        let (width, height) = render_size(1180.0, 760.0);
        assert_eq!(width, 1180 - SIDEBAR_WIDTH as u32);
        assert_eq!(height, 760);
    }

    #[test]
    fn test_render_size_caps_width_and_keeps_aspect() {
        let (width, height) = render_size(4300.0, 2000.0);
        assert_eq!(width, MAX_RENDER_WIDTH);

        // Aspect ratio of the visible area survives the cap
        let visible = 4300.0 - SIDEBAR_WIDTH;
        let expected = (2000.0 * MAX_RENDER_WIDTH as f32 / visible) as u32;
        assert_eq!(height, expected);
    }

    #[test]
    fn test_render_size_never_hits_zero() {
        assert_eq!(render_size(0.0, 0.0), (1, 1));
        assert_eq!(render_size(SIDEBAR_WIDTH, 500.0), (1, 500));
    }
}
