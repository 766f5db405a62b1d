//! ECS marker components shared by input, rendering and the demo scene.

use bevy::prelude::*;

use crate::connection::graph::ConnectionId;

#[derive(Component)]
pub struct MainCamera;

/// Root entity of a building; connection points are its children.
#[derive(Component, Debug, Clone)]
pub struct Building {
    pub name: String,
}

/// The connection point currently under the pointer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlighted;

/// Render entity of a committed connection's ribbon.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRibbon(pub ConnectionId);

/// Render entity of the drag preview ribbon.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRibbon;
