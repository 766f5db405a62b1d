//! egui overlay.

pub mod hud;
