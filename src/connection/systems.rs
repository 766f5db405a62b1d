//! ECS glue: point lifecycle, construction input, removal, and mirroring the
//! graph back onto components.

use bevy::prelude::*;

use super::direction::Direction;
use super::drag::{ConnectionDragController, PlaceOutcome};
use super::graph::{Connection, ConnectionGraph, ConnectionId};
use super::point::ConnectionPoint;
use super::registry::ConnectionRegistry;
use crate::core::components::Highlighted;

/// Signals from whatever drives construction (mouse, tests, scripts).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum ConstructionInput {
    PointerChanged { position: Vec2, direction: Direction },
    Place { position: Vec2, direction: Direction },
    Cancel,
    /// Construction mode was left.
    End,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveConnection {
    One(ConnectionId),
    All,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionCreated {
    pub id: ConnectionId,
    pub start: Entity,
    pub end: Entity,
}

/// Sent after every removal, whatever caused it.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRemoved {
    pub id: ConnectionId,
    pub start: Entity,
    pub end: Entity,
}

impl ConnectionRemoved {
    fn of(id: ConnectionId, connection: &Connection) -> Self {
        Self {
            id,
            start: connection.start(),
            end: connection.end(),
        }
    }
}

/// Result of the most recent place signal, for the HUD.
#[derive(Resource, Debug, Default)]
pub struct LastPlaceOutcome(pub Option<PlaceOutcome>);

pub type PointQuery<'w, 's> = Query<'w, 's, (&'static ConnectionPoint, &'static GlobalTransform)>;

/// Runs after transform propagation so a point is never resolved at a
/// placeholder origin on its first frame.
pub fn register_connection_points_system(
    mut registry: ResMut<ConnectionRegistry>,
    added: Query<Entity, Added<ConnectionPoint>>,
) {
    for entity in &added {
        if registry.add(entity) {
            info!("[REGISTRY] registered {:?} ({} points)", entity, registry.len());
        }
    }
}

/// Deregisters removed points and drops any connection they took part in.
pub fn connection_point_cleanup_system(
    mut removed: RemovedComponents<ConnectionPoint>,
    mut registry: ResMut<ConnectionRegistry>,
    mut graph: ResMut<ConnectionGraph>,
    mut controller: ResMut<ConnectionDragController>,
    mut removed_out: MessageWriter<ConnectionRemoved>,
) {
    for entity in removed.read() {
        if registry.remove(entity) {
            info!("[REGISTRY] deregistered {:?} ({} points)", entity, registry.len());
        }
        controller.forget_point(entity);
        if let Some((id, connection)) = graph.remove_point(entity) {
            removed_out.write(ConnectionRemoved::of(id, &connection));
        }
    }
}

pub fn construction_input_system(
    mut inputs: MessageReader<ConstructionInput>,
    mut controller: ResMut<ConnectionDragController>,
    mut graph: ResMut<ConnectionGraph>,
    mut last_outcome: ResMut<LastPlaceOutcome>,
    mut created: MessageWriter<ConnectionCreated>,
    registry: Res<ConnectionRegistry>,
    points: PointQuery,
) {
    for input in inputs.read() {
        match *input {
            ConstructionInput::PointerChanged {
                position,
                direction,
            } => controller.on_pointer_changed(position, direction, &registry, &points),
            ConstructionInput::Place {
                position,
                direction,
            } => {
                let outcome =
                    controller.on_place(position, direction, &registry, &points, &mut graph);
                if let PlaceOutcome::Connected { id, anchor, target } = outcome {
                    created.write(ConnectionCreated {
                        id,
                        start: anchor,
                        end: target,
                    });
                }
                last_outcome.0 = Some(outcome);
            }
            ConstructionInput::Cancel => controller.cancel(),
            ConstructionInput::End => controller.end(),
        }
    }
}

pub fn remove_connection_system(
    mut requests: MessageReader<RemoveConnection>,
    mut graph: ResMut<ConnectionGraph>,
    mut removed_out: MessageWriter<ConnectionRemoved>,
) {
    for request in requests.read() {
        match *request {
            RemoveConnection::One(id) => match graph.remove(id) {
                Some(connection) => {
                    removed_out.write(ConnectionRemoved::of(id, &connection));
                }
                None => warn!("[CONNECT] remove requested for unknown connection {}", id),
            },
            RemoveConnection::All => {
                for (id, connection) in &graph.clear() {
                    removed_out.write(ConnectionRemoved::of(*id, connection));
                }
            }
        }
    }
}

/// Mirrors the graph's point links into `ConnectionPoint::connected`.
pub fn sync_connection_links_system(
    graph: Res<ConnectionGraph>,
    mut points: Query<(Entity, &mut ConnectionPoint)>,
) {
    for (entity, mut point) in &mut points {
        let linked = graph.connection_of(entity);
        if point.connected != linked {
            point.connected = linked;
        }
    }
}

/// Keeps the `Highlighted` marker on exactly the controller's highlighted point.
pub fn sync_highlight_system(
    mut commands: Commands,
    controller: Res<ConnectionDragController>,
    marked: Query<Entity, With<Highlighted>>,
) {
    let target = controller.highlighted();
    for entity in &marked {
        if Some(entity) != target {
            commands.entity(entity).remove::<Highlighted>();
        }
    }
    if let Some(entity) = target {
        if !marked.contains(entity) {
            commands.entity(entity).try_insert(Highlighted);
        }
    }
}
