//! Rendering: ribbon meshes and point gizmos.

pub mod points;
pub mod ribbons;
