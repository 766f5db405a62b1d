//! Ribbon geometry for connections.
//!
//! Two directed endpoints define a cubic Bezier with exactly two knots. The
//! curve is sampled at a fixed number of points; each sample emits a left and
//! a right rail vertex offset by the half-width along the in-plane normal, and
//! consecutive samples are stitched with two triangles. The ribbon is open:
//! samples span t = 0..=1 and there is no closing segment.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use super::direction::Direction;
use super::graph::ConnectionId;

/// Samples per ribbon build.
pub const DEFAULT_RESOLUTION: usize = 10;
/// Distance from the curve to each rail, in world units.
pub const DEFAULT_HALF_WIDTH: f32 = 0.1;

/// Position plus tangent direction of one ribbon end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointPose {
    pub position: Vec2,
    pub direction: Direction,
}

impl EndpointPose {
    pub fn new(position: Vec2, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonSettings {
    pub resolution: usize,
    pub half_width: f32,
}

impl Default for RibbonSettings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            half_width: DEFAULT_HALF_WIDTH,
        }
    }
}

impl RibbonSettings {
    /// Fewer than two samples cannot form a segment.
    fn sample_count(&self) -> usize {
        self.resolution.max(2)
    }
}

/// Bezier knot with tangents relative to `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierKnot {
    pub position: Vec3,
    pub tangent_in: Vec3,
    pub tangent_out: Vec3,
}

impl BezierKnot {
    /// Start knot: leaves along `direction`.
    pub fn leaving(pose: EndpointPose) -> Self {
        let d = pose.direction.vector().extend(0.0);
        Self {
            position: pose.position.extend(0.0),
            tangent_in: -d,
            tangent_out: d,
        }
    }

    /// End knot: incoming tangent along `direction`, outgoing opposite.
    pub fn arriving(pose: EndpointPose) -> Self {
        let d = pose.direction.vector().extend(0.0);
        Self {
            position: pose.position.extend(0.0),
            tangent_in: d,
            tangent_out: -d,
        }
    }
}

/// Position, forward tangent and up vector at one curve parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
}

/// Two-knot cubic Bezier on the XY plane.
#[derive(Debug, Clone, Default)]
pub struct BezierSpline {
    knots: Vec<BezierKnot>,
}

impl BezierSpline {
    pub fn knots(&self) -> &[BezierKnot] {
        &self.knots
    }

    /// Sets both knots. A knot count other than 0 or 2 is reported and
    /// repaired by rebuilding from scratch; returns false in that case.
    pub fn set_endpoints(&mut self, start: BezierKnot, end: BezierKnot) -> bool {
        match self.knots.len() {
            0 => {
                self.knots.push(start);
                self.knots.push(end);
                true
            }
            2 => {
                self.knots[0] = start;
                self.knots[1] = end;
                true
            }
            n => {
                error!(
                    "[RIBBON] spline has {} knots, expected 0 or 2; resetting to 2",
                    n
                );
                self.knots.clear();
                self.knots.push(start);
                self.knots.push(end);
                false
            }
        }
    }

    fn control_points(&self) -> Option<[Vec3; 4]> {
        let [start, end] = self.knots.as_slice() else {
            return None;
        };
        Some([
            start.position,
            start.position + start.tangent_out,
            end.position + end.tangent_in,
            end.position,
        ])
    }

    /// Evaluates the curve at `t` in [0, 1]. `None` unless exactly two knots exist.
    pub fn evaluate(&self, t: f32) -> Option<CurveSample> {
        let [p0, p1, p2, p3] = self.control_points()?;
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let position =
            u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3;
        let forward =
            3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2);
        Some(CurveSample {
            position,
            forward,
            up: Vec3::Z,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RibbonKind {
    /// Owned and updated by the drag controller.
    Preview,
    /// Geometry of a committed connection; immutable from outside.
    Bound(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RibbonError {
    #[error("ribbon of connection {0} follows its connection and cannot be moved directly")]
    BoundMeshUpdate(ConnectionId),
}

/// Triangulated constant-width strip between two endpoint poses.
#[derive(Debug, Clone)]
pub struct RibbonMesh {
    kind: RibbonKind,
    settings: RibbonSettings,
    spline: BezierSpline,
    start: EndpointPose,
    end: EndpointPose,
    vertices: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl RibbonMesh {
    /// Uncommitted ribbon for a drag in progress.
    pub fn preview(start: EndpointPose, end: EndpointPose, settings: RibbonSettings) -> Self {
        Self::build(RibbonKind::Preview, start, end, settings)
    }

    pub(crate) fn bound(
        id: ConnectionId,
        start: EndpointPose,
        end: EndpointPose,
        settings: RibbonSettings,
    ) -> Self {
        Self::build(RibbonKind::Bound(id), start, end, settings)
    }

    fn build(kind: RibbonKind, start: EndpointPose, end: EndpointPose, settings: RibbonSettings) -> Self {
        let mut ribbon = Self {
            kind,
            settings,
            spline: BezierSpline::default(),
            start,
            end,
            vertices: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        };
        ribbon.rebuild();
        ribbon
    }

    /// Moves both endpoints of a preview ribbon and rebuilds its geometry.
    /// Bound ribbons refuse without touching any state.
    pub fn update(&mut self, start: EndpointPose, end: EndpointPose) -> Result<(), RibbonError> {
        if let RibbonKind::Bound(id) = self.kind {
            warn!("[RIBBON] refused direct update of ribbon bound to connection {}", id);
            return Err(RibbonError::BoundMeshUpdate(id));
        }
        self.start = start;
        self.end = end;
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.spline.set_endpoints(
            BezierKnot::leaving(self.start),
            BezierKnot::arriving(self.end),
        );

        let samples = self.settings.sample_count();
        let half_width = self.settings.half_width;
        let mut vertices = Vec::with_capacity(samples * 2);
        let mut uvs = Vec::with_capacity(samples * 2);

        for i in 0..samples {
            let t = i as f32 / (samples - 1) as f32;
            // set_endpoints always leaves two knots behind
            let Some(sample) = self.spline.evaluate(t) else {
                return;
            };
            let right = sample.forward.cross(sample.up).normalize_or_zero();
            vertices.push(sample.position - right * half_width);
            vertices.push(sample.position + right * half_width);
            uvs.push([t, 0.0]);
            uvs.push([t, 1.0]);
        }

        // Rail layout: left_i = 2i, right_i = 2i + 1. Counter-clockwise winding.
        let mut indices = Vec::with_capacity((samples - 1) * 6);
        for i in 0..(samples - 1) as u32 {
            let (left, right) = (2 * i, 2 * i + 1);
            let (next_left, next_right) = (left + 2, right + 2);
            indices.extend_from_slice(&[left, next_right, next_left]);
            indices.extend_from_slice(&[next_right, left, right]);
        }

        self.vertices = vertices;
        self.uvs = uvs;
        self.indices = indices;
    }

    pub fn kind(&self) -> RibbonKind {
        self.kind
    }

    pub fn is_preview(&self) -> bool {
        self.kind == RibbonKind::Preview
    }

    pub fn settings(&self) -> RibbonSettings {
        self.settings
    }

    pub fn start(&self) -> EndpointPose {
        self.start
    }

    pub fn end(&self) -> EndpointPose {
        self.end
    }

    pub fn spline(&self) -> &BezierSpline {
        &self.spline
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn sample_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// GPU mesh for `Mesh2d`.
    pub fn to_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.to_array()).collect();
        let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone())
        .with_inserted_indices(Indices::U32(self.indices.clone()))
    }
}
