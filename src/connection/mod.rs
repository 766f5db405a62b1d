//! Typed connection points on buildings and the ribbons that join them.

pub mod direction;
pub mod drag;
pub mod graph;
pub mod point;
pub mod registry;
pub mod ribbon;
pub mod systems;

use bevy::prelude::*;
use bevy::transform::TransformSystems;

pub use direction::Direction;
pub use drag::{ConnectionDragController, DragPhase, DragSettings, PlaceOutcome};
pub use graph::{Connection, ConnectionError, ConnectionGraph, ConnectionId};
pub use point::{ConnectionPoint, ConnectionType, PointSource, PointView};
pub use registry::{ConnectionRegistry, NearestPoint};
pub use ribbon::{RibbonError, RibbonKind, RibbonMesh, RibbonSettings};
pub use systems::{
    ConnectionCreated, ConnectionRemoved, ConstructionInput, LastPlaceOutcome, RemoveConnection,
};

use crate::input::pointer::PointerState;

/// Frame ordering of everything that touches connections.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionSet {
    /// Producers of `ConstructionInput` / `RemoveConnection`.
    Input,
    Lifecycle,
    Drag,
    Sync,
    /// Mesh reconciliation and gizmos.
    Render,
}

/// Headless core of the connection subsystem. Rendering and device input are
/// added by the app on top, in `ConnectionSet::Input` / `ConnectionSet::Render`.
#[derive(Default)]
pub struct ConnectionPlugin {
    pub drag: DragSettings,
}

impl Plugin for ConnectionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ConnectionGraph::new(self.drag.ribbon))
            .insert_resource(ConnectionDragController::new(self.drag))
            .init_resource::<ConnectionRegistry>()
            .init_resource::<LastPlaceOutcome>()
            .init_resource::<PointerState>()
            .add_message::<ConstructionInput>()
            .add_message::<RemoveConnection>()
            .add_message::<ConnectionCreated>()
            .add_message::<ConnectionRemoved>()
            .configure_sets(
                Update,
                (
                    ConnectionSet::Input,
                    ConnectionSet::Lifecycle,
                    ConnectionSet::Drag,
                    ConnectionSet::Sync,
                    ConnectionSet::Render,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                systems::connection_point_cleanup_system.in_set(ConnectionSet::Lifecycle),
            )
            // New points join once their GlobalTransform is real.
            .add_systems(
                PostUpdate,
                systems::register_connection_points_system.after(TransformSystems::Propagate),
            )
            .add_systems(
                Update,
                (
                    systems::construction_input_system,
                    systems::remove_connection_system,
                )
                    .chain()
                    .in_set(ConnectionSet::Drag),
            )
            .add_systems(
                Update,
                (
                    systems::sync_connection_links_system,
                    systems::sync_highlight_system,
                )
                    .in_set(ConnectionSet::Sync),
            );
    }
}
