//! Input handling: pointer-driven construction and camera control.

pub mod camera;
pub mod pointer;
