//! Typed, directed attachment sites and the compatibility rule between them.

use bevy::prelude::*;
use std::collections::HashMap;

use super::direction::Direction;
use super::graph::ConnectionId;
use super::ribbon::EndpointPose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Input,
    Output,
    Bidirectional,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 3] = [
        ConnectionType::Input,
        ConnectionType::Output,
        ConnectionType::Bidirectional,
    ];

    /// Input pairs with Output, Bidirectional pairs with anything.
    /// The callee's type is checked first, so symmetry is covered by tests.
    pub fn is_compatible_with(self, other: ConnectionType) -> bool {
        if other == ConnectionType::Bidirectional {
            return true;
        }
        match self {
            ConnectionType::Bidirectional => true,
            ConnectionType::Input => other == ConnectionType::Output,
            ConnectionType::Output => other == ConnectionType::Input,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionType::Input => "input",
            ConnectionType::Output => "output",
            ConnectionType::Bidirectional => "bidirectional",
        }
    }
}

/// A connection site owned by a building entity.
///
/// Location is never stored here: it is read from the entity's
/// `GlobalTransform` on every query. `direction` is relative to the owner's
/// rotation. `connected` mirrors the graph's link table and is only a handle,
/// never ownership.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub point_type: ConnectionType,
    pub direction: Direction,
    pub connected: Option<ConnectionId>,
}

impl ConnectionPoint {
    pub fn new(point_type: ConnectionType, direction: Direction) -> Self {
        Self {
            point_type,
            direction,
            connected: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    pub fn is_compatible_with(&self, other: &ConnectionPoint) -> bool {
        self.point_type.is_compatible_with(other.point_type)
    }

    /// World-space snapshot of this point for the given transform.
    pub fn view(&self, transform: &GlobalTransform) -> PointView {
        let (_, rotation, translation) = transform.to_scale_rotation_translation();
        let (z_angle, _, _) = rotation.to_euler(EulerRot::ZYX);
        PointView {
            location: translation.truncate(),
            point_type: self.point_type,
            direction: self.direction.rotated(z_angle.to_degrees()),
        }
    }
}

/// What a query needs to know about a point at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointView {
    pub location: Vec2,
    pub point_type: ConnectionType,
    pub direction: Direction,
}

impl PointView {
    pub fn new(location: Vec2, point_type: ConnectionType, direction: Direction) -> Self {
        Self {
            location,
            point_type,
            direction,
        }
    }

    pub fn pose(&self) -> EndpointPose {
        EndpointPose::new(self.location, self.direction)
    }

    pub fn is_compatible_with(&self, other: &PointView) -> bool {
        self.point_type.is_compatible_with(other.point_type)
    }
}

/// Resolves a registered point entity to its current world-space view.
pub trait PointSource {
    fn point(&self, entity: Entity) -> Option<PointView>;
}

impl<'w, 's, 'a, 'b> PointSource for Query<'w, 's, (&'a ConnectionPoint, &'b GlobalTransform)> {
    fn point(&self, entity: Entity) -> Option<PointView> {
        let (point, transform) = self.get(entity).ok()?;
        Some(point.view(transform))
    }
}

impl PointSource for HashMap<Entity, PointView> {
    fn point(&self, entity: Entity) -> Option<PointView> {
        self.get(&entity).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_table() {
        use ConnectionType::*;
        assert!(Input.is_compatible_with(Output));
        assert!(Output.is_compatible_with(Input));
        assert!(!Input.is_compatible_with(Input));
        assert!(!Output.is_compatible_with(Output));
        for t in ConnectionType::ALL {
            assert!(Bidirectional.is_compatible_with(t), "bidirectional -> {t:?}");
            assert!(t.is_compatible_with(Bidirectional), "{t:?} -> bidirectional");
        }
    }

    #[test]
    fn compatibility_is_symmetric() {
        for a in ConnectionType::ALL {
            for b in ConnectionType::ALL {
                assert_eq!(
                    a.is_compatible_with(b),
                    b.is_compatible_with(a),
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn point_compatibility_delegates_to_type() {
        let input = ConnectionPoint::new(ConnectionType::Input, Direction::RIGHT);
        let output = ConnectionPoint::new(ConnectionType::Output, Direction::RIGHT);
        assert!(input.is_compatible_with(&output));
        assert!(!input.is_compatible_with(&input.clone()));
    }

    #[test]
    fn view_reads_translation_and_owner_rotation() {
        let point = ConnectionPoint::new(ConnectionType::Output, Direction::from_degrees(10.0));
        let transform = GlobalTransform::from(
            Transform::from_xyz(3.0, -2.0, 0.0)
                .with_rotation(Quat::from_rotation_z(90f32.to_radians())),
        );
        let view = point.view(&transform);
        assert!(view.location.distance(Vec2::new(3.0, -2.0)) < 1e-5);
        assert!(view.direction.approx_eq(Direction::from_degrees(100.0), 1e-4));
        assert_eq!(view.point_type, ConnectionType::Output);
    }

    #[test]
    fn new_point_is_unconnected() {
        let point = ConnectionPoint::new(ConnectionType::Input, Direction::RIGHT);
        assert!(!point.is_connected());
    }
}
