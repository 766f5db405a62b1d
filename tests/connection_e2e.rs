//! E2E tests for the connection subsystem: point lifecycle, drag-to-connect,
//! and cascade removal, driven frame by frame through messages.

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use tether::connection::{
    ConnectionCreated, ConnectionDragController, ConnectionGraph, ConnectionPlugin,
    ConnectionPoint, ConnectionRegistry, ConnectionRemoved, ConnectionSet, ConnectionType,
    ConstructionInput, Direction, LastPlaceOutcome, PlaceOutcome, RemoveConnection,
};
use bevy::asset::AssetPlugin;
use tether::connection::ConnectionId;
use tether::core::components::{ConnectionRibbon, Highlighted, PreviewRibbon};
use tether::core::config::TetherConfig;
use tether::core::helpers::{spawn_building, PointLayout};
use tether::render::ribbons::{
    setup_ribbon_materials, sync_connection_ribbons_system, sync_preview_ribbon_system,
};

#[derive(Resource, Default)]
struct Collected {
    created: Vec<ConnectionCreated>,
    removed: Vec<ConnectionRemoved>,
}

fn collect_messages(
    mut collected: ResMut<Collected>,
    mut created: MessageReader<ConnectionCreated>,
    mut removed: MessageReader<ConnectionRemoved>,
) {
    collected.created.extend(created.read().copied());
    collected.removed.extend(removed.read().copied());
}

fn connection_test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin, ConnectionPlugin::default()))
        .init_resource::<Collected>()
        .add_systems(Update, collect_messages.after(ConnectionSet::Sync));
    app
}

/// Headless app plus the ribbon render reconciliation.
fn render_test_app() -> App {
    let mut app = connection_test_app();
    app.add_plugins(AssetPlugin::default())
        .init_asset::<Mesh>()
        .init_asset::<ColorMaterial>()
        .insert_resource(TetherConfig::default())
        .add_systems(Startup, setup_ribbon_materials)
        .add_systems(
            Update,
            (sync_connection_ribbons_system, sync_preview_ribbon_system)
                .in_set(ConnectionSet::Render),
        );
    app
}

fn ribbon_ids(app: &mut App) -> Vec<ConnectionId> {
    let world = app.world_mut();
    let mut ids: Vec<_> = world
        .query::<&ConnectionRibbon>()
        .iter(world)
        .map(|ribbon| ribbon.0)
        .collect();
    ids.sort();
    ids
}

fn preview_count(app: &mut App) -> usize {
    let world = app.world_mut();
    world
        .query_filtered::<Entity, With<PreviewRibbon>>()
        .iter(world)
        .count()
}

fn spawn(app: &mut App, position: Vec2, rotation: f32, points: &[PointLayout]) -> (Entity, Vec<Entity>) {
    let world = app.world_mut();
    let spawned = {
        let mut commands = world.commands();
        spawn_building(&mut commands, "test", position, rotation, points)
    };
    world.flush();
    spawned
}

fn send(app: &mut App, input: ConstructionInput) {
    app.world_mut().write_message(input);
}

fn pointer(app: &mut App, x: f32, y: f32) {
    send(
        app,
        ConstructionInput::PointerChanged {
            position: Vec2::new(x, y),
            direction: Direction::RIGHT,
        },
    );
}

fn place(app: &mut App, x: f32, y: f32) {
    send(
        app,
        ConstructionInput::Place {
            position: Vec2::new(x, y),
            direction: Direction::RIGHT,
        },
    );
}

fn last_outcome(app: &App) -> Option<PlaceOutcome> {
    app.world().resource::<LastPlaceOutcome>().0
}

/// Output at (1, 0) facing +X, Input at (2, 0) facing -X.
fn two_buildings(app: &mut App) -> (Entity, Entity, Entity, Entity) {
    let (producer, out) = spawn(
        app,
        Vec2::ZERO,
        0.0,
        &[PointLayout::new(ConnectionType::Output, Vec2::new(1.0, 0.0), Direction::from_degrees(0.0))],
    );
    let (consumer, inp) = spawn(
        app,
        Vec2::new(3.0, 0.0),
        0.0,
        &[PointLayout::new(ConnectionType::Input, Vec2::new(-1.0, 0.0), Direction::from_degrees(180.0))],
    );
    app.update();
    (producer, out[0], consumer, inp[0])
}

/// Drags from `from` to `to` over two frames.
fn drag(app: &mut App, from: Vec2, to: Vec2) {
    pointer(app, from.x, from.y);
    place(app, from.x, from.y);
    app.update();
    pointer(app, to.x, to.y);
    place(app, to.x, to.y);
    app.update();
}

#[test]
fn e2e_points_register_and_deregister() {
    let mut app = connection_test_app();
    let (_, points) = spawn(
        &mut app,
        Vec2::ZERO,
        0.0,
        &[
            PointLayout::new(ConnectionType::Input, Vec2::new(-1.0, 0.0), Direction::from_degrees(180.0)),
            PointLayout::new(ConnectionType::Output, Vec2::new(1.0, 0.0), Direction::from_degrees(0.0)),
            PointLayout::new(ConnectionType::Bidirectional, Vec2::new(0.0, 1.0), Direction::from_degrees(90.0)),
        ],
    );
    app.update();
    assert_eq!(app.world().resource::<ConnectionRegistry>().len(), 3);

    app.world_mut().entity_mut(points[1]).despawn();
    app.update();
    let registry = app.world().resource::<ConnectionRegistry>();
    assert_eq!(registry.len(), 2);
    assert!(!registry.contains(points[1]));
    assert!(registry.contains(points[0]));
}

#[test]
fn e2e_point_pose_follows_owner_rotation() {
    let mut app = connection_test_app();
    let (_, points) = spawn(
        &mut app,
        Vec2::new(3.0, 0.0),
        90.0,
        &[PointLayout::new(ConnectionType::Input, Vec2::new(-1.0, 0.0), Direction::from_degrees(180.0))],
    );
    app.update();

    let world = app.world_mut();
    let (point, transform) = world
        .query::<(&ConnectionPoint, &GlobalTransform)>()
        .get(world, points[0])
        .unwrap();
    let view = point.view(transform);
    assert!(view.location.distance(Vec2::new(3.0, -1.0)) < 1e-4);
    assert!(view.direction.approx_eq(Direction::from_degrees(270.0), 1e-4));
}

#[test]
fn e2e_drag_to_connect() {
    let mut app = connection_test_app();
    let (_, out, _, inp) = two_buildings(&mut app);

    pointer(&mut app, 1.0, 0.0);
    place(&mut app, 1.0, 0.0);
    app.update();
    assert_eq!(last_outcome(&app), Some(PlaceOutcome::Started { anchor: out }));
    assert!(app.world().resource::<ConnectionDragController>().preview().is_some());

    pointer(&mut app, 2.1, 0.0);
    place(&mut app, 2.1, 0.0);
    app.update();

    let graph = app.world().resource::<ConnectionGraph>();
    assert_eq!(graph.len(), 1);
    let id = graph.connection_of(out).unwrap();
    assert_eq!(graph.connection_of(inp), Some(id));
    let connection = graph.get(id).unwrap();
    assert_eq!((connection.start(), connection.end()), (out, inp));
    assert_eq!(connection.ribbon().start().position, Vec2::new(1.0, 0.0));
    assert_eq!(connection.ribbon().end().position, Vec2::new(2.0, 0.0));

    assert!(app.world().resource::<ConnectionDragController>().preview().is_none());
    assert_eq!(
        app.world().resource::<Collected>().created,
        vec![ConnectionCreated {
            id,
            start: out,
            end: inp
        }]
    );
    assert_eq!(app.world().get::<ConnectionPoint>(out).unwrap().connected, Some(id));
    assert_eq!(app.world().get::<ConnectionPoint>(inp).unwrap().connected, Some(id));
}

#[test]
fn e2e_drag_out_of_range_then_commit() {
    let mut app = connection_test_app();
    let (_, out, _, inp) = two_buildings(&mut app);

    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(1.3, 0.0));
    assert!(matches!(
        last_outcome(&app),
        Some(PlaceOutcome::OutOfRange { target, .. }) if target == inp
    ));
    assert!(app.world().resource::<ConnectionGraph>().is_empty());
    assert!(app.world().resource::<ConnectionDragController>().is_dragging());

    pointer(&mut app, 2.0, 0.0);
    place(&mut app, 2.0, 0.0);
    app.update();
    let graph = app.world().resource::<ConnectionGraph>();
    assert_eq!(graph.len(), 1);
    assert!(graph.connection_of(out).is_some());
}

#[test]
fn e2e_incompatible_points_do_not_connect() {
    let mut app = connection_test_app();
    spawn(
        &mut app,
        Vec2::ZERO,
        0.0,
        &[
            PointLayout::new(ConnectionType::Input, Vec2::new(1.0, 0.0), Direction::from_degrees(0.0)),
            PointLayout::new(ConnectionType::Input, Vec2::new(2.0, 0.0), Direction::from_degrees(180.0)),
        ],
    );
    app.update();

    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    assert_eq!(last_outcome(&app), Some(PlaceOutcome::NoTarget));
    assert!(app.world().resource::<ConnectionGraph>().is_empty());
    assert!(!app.world().resource::<ConnectionDragController>().is_dragging());
    assert!(app.world().resource::<Collected>().created.is_empty());
}

#[test]
fn e2e_cancel_drops_preview() {
    let mut app = connection_test_app();
    two_buildings(&mut app);

    pointer(&mut app, 1.0, 0.0);
    place(&mut app, 1.0, 0.0);
    app.update();
    assert!(app.world().resource::<ConnectionDragController>().is_dragging());

    send(&mut app, ConstructionInput::Cancel);
    app.update();
    let controller = app.world().resource::<ConnectionDragController>();
    assert!(!controller.is_dragging());
    assert!(controller.preview().is_none());
}

#[test]
fn e2e_highlight_marker_tracks_pointer() {
    let mut app = connection_test_app();
    let (_, out, _, inp) = two_buildings(&mut app);

    pointer(&mut app, 1.1, 0.0);
    app.update();
    assert!(app.world().get::<Highlighted>(out).is_some());
    assert!(app.world().get::<Highlighted>(inp).is_none());

    pointer(&mut app, 1.9, 0.0);
    app.update();
    assert!(app.world().get::<Highlighted>(out).is_none());
    assert!(app.world().get::<Highlighted>(inp).is_some());

    pointer(&mut app, 10.0, 10.0);
    app.update();
    assert!(app.world().get::<Highlighted>(inp).is_none());
}

#[test]
fn e2e_despawning_building_cascades_to_connection() {
    let mut app = connection_test_app();
    let (producer, out, _, inp) = two_buildings(&mut app);
    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    let id = app
        .world()
        .resource::<ConnectionGraph>()
        .connection_of(inp)
        .unwrap();

    app.world_mut().entity_mut(producer).despawn();
    app.update();

    assert!(app.world().resource::<ConnectionGraph>().is_empty());
    assert!(!app.world().resource::<ConnectionRegistry>().contains(out));
    assert_eq!(app.world().get::<ConnectionPoint>(inp).unwrap().connected, None);
    assert_eq!(
        app.world().resource::<Collected>().removed,
        vec![ConnectionRemoved {
            id,
            start: out,
            end: inp
        }]
    );
}

#[test]
fn e2e_remove_connection_message() {
    let mut app = connection_test_app();
    let (_, out, _, inp) = two_buildings(&mut app);
    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    let id = app
        .world()
        .resource::<ConnectionGraph>()
        .connection_of(out)
        .unwrap();

    app.world_mut().write_message(RemoveConnection::One(id));
    app.update();

    assert!(app.world().resource::<ConnectionGraph>().is_empty());
    assert_eq!(app.world().get::<ConnectionPoint>(out).unwrap().connected, None);
    assert_eq!(app.world().get::<ConnectionPoint>(inp).unwrap().connected, None);
    assert_eq!(app.world().resource::<Collected>().removed.len(), 1);

    // Both points are free again.
    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    assert_eq!(app.world().resource::<ConnectionGraph>().len(), 1);
}

#[test]
fn e2e_clear_all_connections() {
    let mut app = connection_test_app();
    two_buildings(&mut app);
    spawn(
        &mut app,
        Vec2::new(0.0, 5.0),
        0.0,
        &[
            PointLayout::new(ConnectionType::Bidirectional, Vec2::ZERO, Direction::RIGHT),
            PointLayout::new(ConnectionType::Input, Vec2::new(2.0, 0.0), Direction::from_degrees(180.0)),
        ],
    );
    app.update();

    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    drag(&mut app, Vec2::new(0.0, 5.0), Vec2::new(2.0, 5.0));
    assert_eq!(app.world().resource::<ConnectionGraph>().len(), 2);

    app.world_mut().write_message(RemoveConnection::All);
    app.update();
    assert!(app.world().resource::<ConnectionGraph>().is_empty());
    assert_eq!(app.world().resource::<Collected>().removed.len(), 2);
}

#[test]
fn e2e_render_entities_follow_the_graph() {
    let mut app = render_test_app();
    let (_, out, _, _) = two_buildings(&mut app);
    spawn(
        &mut app,
        Vec2::new(0.0, 5.0),
        0.0,
        &[
            PointLayout::new(ConnectionType::Output, Vec2::ZERO, Direction::RIGHT),
            PointLayout::new(ConnectionType::Input, Vec2::new(2.0, 0.0), Direction::from_degrees(180.0)),
        ],
    );
    app.update();
    assert!(ribbon_ids(&mut app).is_empty());

    drag(&mut app, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
    drag(&mut app, Vec2::new(0.0, 5.0), Vec2::new(2.0, 5.0));
    let graph = app.world().resource::<ConnectionGraph>();
    let first = graph.connection_of(out).unwrap();
    let mut all: Vec<_> = graph.iter().map(|(id, _)| id).collect();
    all.sort();
    assert_eq!(ribbon_ids(&mut app), all);
    let second = all.into_iter().find(|id| *id != first).unwrap();

    app.world_mut().write_message(RemoveConnection::One(first));
    app.update();
    assert_eq!(ribbon_ids(&mut app), vec![second]);
}

#[test]
fn e2e_preview_entity_exists_only_while_dragging() {
    let mut app = render_test_app();
    two_buildings(&mut app);
    assert_eq!(preview_count(&mut app), 0);

    pointer(&mut app, 1.0, 0.0);
    place(&mut app, 1.0, 0.0);
    app.update();
    assert_eq!(preview_count(&mut app), 1);

    pointer(&mut app, 1.5, 0.4);
    app.update();
    assert_eq!(preview_count(&mut app), 1);

    send(&mut app, ConstructionInput::Cancel);
    app.update();
    assert_eq!(preview_count(&mut app), 0);
}

#[derive(Resource, Default)]
struct LateSpawn(Option<Entity>);

fn spawn_point_mid_frame(mut commands: Commands, mut late: ResMut<LateSpawn>) {
    if late.0.is_some() {
        return;
    }
    let (_, points) = spawn_building(
        &mut commands,
        "late",
        Vec2::new(5.0, 0.0),
        0.0,
        &[PointLayout::new(ConnectionType::Input, Vec2::ZERO, Direction::RIGHT)],
    );
    late.0 = Some(points[0]);
}

#[test]
fn e2e_point_spawned_mid_frame_is_never_seen_at_origin() {
    let mut app = connection_test_app();
    app.init_resource::<LateSpawn>()
        .add_systems(Update, spawn_point_mid_frame.in_set(ConnectionSet::Input));

    // Pointer at the origin in the same frame the point is spawned.
    pointer(&mut app, 0.0, 0.0);
    app.update();
    let point = app.world().resource::<LateSpawn>().0.unwrap();
    assert!(app.world().resource::<ConnectionRegistry>().contains(point));
    assert_eq!(app.world().resource::<ConnectionDragController>().highlighted(), None);

    pointer(&mut app, 0.0, 0.0);
    app.update();
    assert_eq!(app.world().resource::<ConnectionDragController>().highlighted(), None);

    pointer(&mut app, 5.1, 0.0);
    app.update();
    assert_eq!(
        app.world().resource::<ConnectionDragController>().highlighted(),
        Some(point)
    );
}
