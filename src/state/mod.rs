/// State management module
///
/// This module handles all application state, including:
/// - Render parameters driven by the sliders (params.rs)
/// - Session persistence of those parameters (session.rs)

pub mod params;
pub mod session;
