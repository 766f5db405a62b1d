//! Gizmo markers for connection points and the construction pointer.

use bevy::prelude::*;

use crate::connection::point::ConnectionPoint;
use crate::core::components::Highlighted;
use crate::core::config::TetherConfig;
use crate::input::pointer::PointerState;

/// Marker radius at scale 1.
pub const POINT_RADIUS: f32 = 0.1;
/// Length of the direction tick at scale 1.
pub const DIRECTION_LENGTH: f32 = 0.3;

/// Circle colored by point type plus a direction tick. Highlighted points are
/// drawn larger; connected points get an inner ring.
pub fn draw_connection_points_system(
    mut gizmos: Gizmos,
    config: Res<TetherConfig>,
    points: Query<(&ConnectionPoint, &GlobalTransform, Has<Highlighted>)>,
) {
    for (point, transform, highlighted) in &points {
        let view = point.view(transform);
        let scale = if highlighted { config.highlight_scale } else { 1.0 };
        let color = config.point_color(view.point_type);
        gizmos.circle_2d(view.location, POINT_RADIUS * scale, color);
        if point.is_connected() {
            gizmos.circle_2d(view.location, POINT_RADIUS * scale * 0.5, color);
        }
        let tip = view.location + view.direction.vector() * DIRECTION_LENGTH * scale;
        gizmos.line_2d(view.location, tip, color);
    }
}

pub fn draw_pointer_system(
    mut gizmos: Gizmos,
    config: Res<TetherConfig>,
    pointer: Res<PointerState>,
) {
    let Some(position) = pointer.position else {
        return;
    };
    let tip = position + pointer.direction.vector() * DIRECTION_LENGTH;
    gizmos.arrow_2d(position, tip, config.preview_color());
}
