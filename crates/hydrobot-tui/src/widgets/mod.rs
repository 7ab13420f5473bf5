//! Reusable widgets shared by the screens.

pub mod indicators;
pub mod joystick;
pub mod text_field;
