//! Terminal UI module using ratatui.
//!
//! - `render`: frame rendering for the loading, sign-in and dashboard views
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling

pub mod input;
pub mod render;
pub mod styles;
