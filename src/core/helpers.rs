//! Spawning helpers for buildings and their connection points.

use bevy::prelude::*;

use crate::connection::direction::Direction;
use crate::connection::point::{ConnectionPoint, ConnectionType};
use crate::core::components::Building;

/// Building footprint in world units.
pub const BUILDING_SIZE: Vec2 = Vec2::new(1.6, 1.2);
/// Dark slate building color.
pub const BUILDING_COLOR: Color = Color::srgb(0.27, 0.28, 0.35);

/// Local placement of one connection point on a building.
#[derive(Debug, Clone, Copy)]
pub struct PointLayout {
    pub point_type: ConnectionType,
    pub offset: Vec2,
    pub direction: Direction,
}

impl PointLayout {
    pub fn new(point_type: ConnectionType, offset: Vec2, direction: Direction) -> Self {
        Self {
            point_type,
            offset,
            direction,
        }
    }
}

/// Spawn a building at `position`, rotated by `rotation_degrees` about Z, with
/// one child entity per connection point. Returns the building and its points
/// in the order given.
pub fn spawn_building(
    commands: &mut Commands,
    name: impl Into<String>,
    position: Vec2,
    rotation_degrees: f32,
    points: &[PointLayout],
) -> (Entity, Vec<Entity>) {
    let building = commands
        .spawn((
            Transform::from_xyz(position.x, position.y, 0.0)
                .with_rotation(Quat::from_rotation_z(rotation_degrees.to_radians())),
            Visibility::default(),
            Building { name: name.into() },
        ))
        .with_children(|parent| {
            parent.spawn((
                Sprite::from_color(BUILDING_COLOR, BUILDING_SIZE),
                Transform::from_xyz(0.0, 0.0, -0.1),
            ));
        })
        .id();

    let point_entities = points
        .iter()
        .map(|layout| {
            let point = commands
                .spawn((
                    ConnectionPoint::new(layout.point_type, layout.direction),
                    Transform::from_xyz(layout.offset.x, layout.offset.y, 0.0),
                    Visibility::default(),
                ))
                .id();
            commands.entity(building).add_child(point);
            point
        })
        .collect();

    (building, point_entities)
}

/// Point layout of the demo producer/consumer/relay trio.
pub fn demo_buildings() -> [(&'static str, Vec2, f32, Vec<PointLayout>); 3] {
    use ConnectionType::*;
    let half = BUILDING_SIZE / 2.0;
    [
        (
            "Producer",
            Vec2::new(-3.0, 1.0),
            0.0,
            vec![
                PointLayout::new(Output, Vec2::new(half.x, 0.2), Direction::from_degrees(0.0)),
                PointLayout::new(Output, Vec2::new(half.x, -0.3), Direction::from_degrees(0.0)),
            ],
        ),
        (
            "Consumer",
            Vec2::new(3.0, 0.5),
            0.0,
            vec![
                PointLayout::new(Input, Vec2::new(-half.x, 0.2), Direction::from_degrees(180.0)),
                PointLayout::new(Input, Vec2::new(-half.x, -0.3), Direction::from_degrees(180.0)),
            ],
        ),
        (
            "Relay",
            Vec2::new(0.0, -2.0),
            30.0,
            vec![
                PointLayout::new(Input, Vec2::new(-half.x, 0.0), Direction::from_degrees(180.0)),
                PointLayout::new(Output, Vec2::new(half.x, 0.0), Direction::from_degrees(0.0)),
                PointLayout::new(Bidirectional, Vec2::new(0.0, half.y), Direction::from_degrees(90.0)),
            ],
        ),
    ]
}

pub fn spawn_demo_scene(commands: &mut Commands) {
    for (name, position, rotation, points) in demo_buildings() {
        let (_, spawned) = spawn_building(commands, name, position, rotation, &points);
        info!("[SCENE] spawned {} with {} connection points", name, spawned.len());
    }
}
