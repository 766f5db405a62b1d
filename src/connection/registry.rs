//! Session-scoped registry of live connection points with nearest-point queries.

use bevy::prelude::*;
use std::collections::HashSet;

use super::point::{ConnectionType, PointSource, PointView};

/// All registered connection points. Membership is unique and iteration
/// order is insertion order, removals included.
#[derive(Resource, Default, Debug)]
pub struct ConnectionRegistry {
    points: Vec<Entity>,
    members: HashSet<Entity>,
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub entity: Entity,
    pub view: PointView,
    pub distance: f32,
}

impl ConnectionRegistry {
    /// Registers a point. Returns false if it was already present.
    pub fn add(&mut self, entity: Entity) -> bool {
        if !self.members.insert(entity) {
            return false;
        }
        self.points.push(entity);
        true
    }

    /// Deregisters a point. Removing an absent point is a no-op.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.members.remove(&entity) {
            return false;
        }
        // Shifting keeps ties resolving to the earliest registration.
        self.points.retain(|&point| point != entity);
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.points.iter().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.members.clear();
    }

    /// Closest registered point to `position`, or `None` for an empty registry.
    pub fn nearest(&self, position: Vec2, points: &impl PointSource) -> Option<NearestPoint> {
        self.nearest_matching(position, points, |_, _| true)
    }

    /// Closest point whose type equals `point_type`. `None` when no point of
    /// that type is registered; never falls back to another type.
    pub fn nearest_of_type(
        &self,
        position: Vec2,
        point_type: ConnectionType,
        points: &impl PointSource,
    ) -> Option<NearestPoint> {
        self.nearest_matching(position, points, |_, view| view.point_type == point_type)
    }

    /// Closest point that `reference` may connect to. The reference point
    /// itself is never a candidate. `None` when nothing compatible exists or
    /// the reference cannot be resolved.
    pub fn nearest_compatible_with(
        &self,
        position: Vec2,
        reference: Entity,
        points: &impl PointSource,
    ) -> Option<NearestPoint> {
        self.nearest_compatible_where(position, reference, points, |_| true)
    }

    /// Like `nearest_compatible_with`, restricted to candidates `accept` allows.
    pub fn nearest_compatible_where(
        &self,
        position: Vec2,
        reference: Entity,
        points: &impl PointSource,
        accept: impl Fn(Entity) -> bool,
    ) -> Option<NearestPoint> {
        let Some(reference_view) = points.point(reference) else {
            warn!("[REGISTRY] compatibility query for unresolvable point {:?}", reference);
            return None;
        };
        self.nearest_matching(position, points, |entity, view| {
            entity != reference && reference_view.is_compatible_with(view) && accept(entity)
        })
    }

    // Linear scan; strict `<` keeps the first of equally distant points.
    fn nearest_matching(
        &self,
        position: Vec2,
        points: &impl PointSource,
        filter: impl Fn(Entity, &PointView) -> bool,
    ) -> Option<NearestPoint> {
        let mut best: Option<NearestPoint> = None;
        for &entity in &self.points {
            let Some(view) = points.point(entity) else {
                continue;
            };
            if !filter(entity, &view) {
                continue;
            }
            let distance = position.distance(view.location);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(NearestPoint {
                    entity,
                    view,
                    distance,
                });
            }
        }
        best
    }
}
