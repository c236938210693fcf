/// UI building blocks
///
/// - `controls.rs` - the slider sidebar
/// - `viewport.rs` - the rendered-frame display and its sizing rules

pub mod controls;
pub mod viewport;
