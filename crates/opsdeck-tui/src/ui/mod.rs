//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, the login screen, the shell and its views
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
