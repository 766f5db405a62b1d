//! Drag-to-connect controller.
//!
//! Each tick the input layer reports the pointer pose. Without a drag the
//! controller only tracks which point is highlighted. `on_place` starts a drag
//! from the highlighted point, and a second `on_place` commits to the nearest
//! compatible point within snap distance. A drag stays open indefinitely until
//! it commits or is cancelled.

use bevy::prelude::*;

use super::direction::Direction;
use super::graph::{ConnectionGraph, ConnectionId};
use super::point::{PointSource, PointView};
use super::registry::ConnectionRegistry;
use super::ribbon::{EndpointPose, RibbonMesh, RibbonSettings};

/// Default pointer-to-point snapping radius, in world units.
pub const DEFAULT_SNAP_DISTANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    pub snap_distance: f32,
    pub ribbon: RibbonSettings,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
            ribbon: RibbonSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    HighlightOnly,
    Dragging,
}

/// What a `place` signal did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceOutcome {
    /// Not dragging and nothing highlighted.
    Ignored,
    Started { anchor: Entity },
    Connected { id: ConnectionId, anchor: Entity, target: Entity },
    /// A free target was in range but the graph refused the connection,
    /// e.g. because the anchor itself is already connected.
    Rejected { anchor: Entity, target: Entity },
    /// No free compatible point exists; the drag was dropped.
    NoTarget,
    /// The nearest compatible point is beyond snap distance; still dragging.
    OutOfRange { target: Entity, distance: f32 },
    /// The drag lost its anchor and was torn down.
    Aborted,
}

#[derive(Debug)]
struct DragSession {
    anchor: Entity,
    preview: RibbonMesh,
}

#[derive(Resource, Debug, Default)]
pub struct ConnectionDragController {
    settings: DragSettings,
    highlighted: Option<Entity>,
    session: Option<DragSession>,
}

impl ConnectionDragController {
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> DragSettings {
        self.settings
    }

    pub fn phase(&self) -> DragPhase {
        match (&self.session, self.highlighted) {
            (Some(_), _) => DragPhase::Dragging,
            (None, Some(_)) => DragPhase::HighlightOnly,
            (None, None) => DragPhase::Idle,
        }
    }

    pub fn highlighted(&self) -> Option<Entity> {
        self.highlighted
    }

    pub fn anchor(&self) -> Option<Entity> {
        self.session.as_ref().map(|s| s.anchor)
    }

    pub fn preview(&self) -> Option<&RibbonMesh> {
        self.session.as_ref().map(|s| &s.preview)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Per-tick pointer update. The drag preview is refreshed first, then the
    /// highlight, so a later `on_place` sees this tick's highlight.
    pub fn on_pointer_changed(
        &mut self,
        position: Vec2,
        direction: Direction,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
    ) {
        if self.session.is_some() {
            self.update_drag(EndpointPose::new(position, direction), registry, points);
        }
        self.update_highlight(position, registry, points);
    }

    pub fn on_place(
        &mut self,
        position: Vec2,
        direction: Direction,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
        graph: &mut ConnectionGraph,
    ) -> PlaceOutcome {
        if self.session.is_some() {
            self.finish_drag(position, registry, points, graph)
        } else {
            self.start_drag(EndpointPose::new(position, direction), registry, points)
        }
    }

    /// Drops any drag in progress and clears the highlight.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            info!("[DRAG] cancelled drag from {:?}", session.anchor);
        }
        self.highlighted = None;
    }

    /// Leaving connection mode: same teardown as `cancel`.
    pub fn end(&mut self) {
        self.cancel();
    }

    /// A point left the registry: drop it from the highlight, and abort the
    /// drag if it was the anchor.
    pub fn forget_point(&mut self, point: Entity) {
        if self.highlighted == Some(point) {
            self.highlighted = None;
        }
        if self.anchor() == Some(point) {
            warn!("[DRAG] anchor {:?} despawned mid-drag; dropping preview", point);
            self.session = None;
        }
    }

    fn start_drag(
        &mut self,
        pointer: EndpointPose,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
    ) -> PlaceOutcome {
        let Some(anchor) = self.highlighted else {
            return PlaceOutcome::Ignored;
        };
        let Some(anchor_view) = resolve_anchor(anchor, registry, points) else {
            error!("[DRAG] highlighted point {:?} is no longer registered", anchor);
            self.highlighted = None;
            return PlaceOutcome::Aborted;
        };
        let preview = RibbonMesh::preview(anchor_view.pose(), pointer, self.settings.ribbon);
        self.session = Some(DragSession { anchor, preview });
        info!("[DRAG] started from {:?}", anchor);
        PlaceOutcome::Started { anchor }
    }

    fn update_drag(
        &mut self,
        pointer: EndpointPose,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(anchor_view) = resolve_anchor(session.anchor, registry, points) else {
            self.abort_drag();
            return;
        };
        if let Err(err) = session.preview.update(anchor_view.pose(), pointer) {
            error!("[DRAG] preview rejected update: {}", err);
            self.abort_drag();
        }
    }

    fn finish_drag(
        &mut self,
        position: Vec2,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
        graph: &mut ConnectionGraph,
    ) -> PlaceOutcome {
        let Some(anchor) = self.anchor() else {
            return PlaceOutcome::Ignored;
        };
        if resolve_anchor(anchor, registry, points).is_none() {
            self.abort_drag();
            return PlaceOutcome::Aborted;
        }

        // Occupied points cannot take a second connection, so they never win.
        let Some(target) = registry.nearest_compatible_where(position, anchor, points, |entity| {
            graph.connection_of(entity).is_none()
        }) else {
            self.session = None;
            info!("[DRAG] no compatible point for {:?}; drag dropped", anchor);
            return PlaceOutcome::NoTarget;
        };
        if target.distance > self.settings.snap_distance {
            return PlaceOutcome::OutOfRange {
                target: target.entity,
                distance: target.distance,
            };
        }

        self.session = None;
        match graph.create_connection(anchor, target.entity, points) {
            Ok(id) => PlaceOutcome::Connected {
                id,
                anchor,
                target: target.entity,
            },
            Err(_) => PlaceOutcome::Rejected {
                anchor,
                target: target.entity,
            },
        }
    }

    fn abort_drag(&mut self) {
        if let Some(session) = self.session.take() {
            error!(
                "[DRAG] anchor {:?} vanished while dragging; preview destroyed",
                session.anchor
            );
        }
    }

    fn update_highlight(
        &mut self,
        position: Vec2,
        registry: &ConnectionRegistry,
        points: &impl PointSource,
    ) {
        self.highlighted = registry
            .nearest(position, points)
            .filter(|hit| hit.distance < self.settings.snap_distance)
            .map(|hit| hit.entity);
    }
}

fn resolve_anchor(
    anchor: Entity,
    registry: &ConnectionRegistry,
    points: &impl PointSource,
) -> Option<PointView> {
    if !registry.contains(anchor) {
        return None;
    }
    points.point(anchor)
}
