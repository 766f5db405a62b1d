//! Ribbon render entities, reconciled against the graph and drag controller.

use bevy::prelude::*;

use crate::connection::drag::ConnectionDragController;
use crate::connection::graph::{ConnectionGraph, ConnectionId};
use crate::core::components::{ConnectionRibbon, PreviewRibbon};
use crate::core::config::TetherConfig;

/// Ribbons draw above building sprites.
const RIBBON_Z: f32 = 0.5;
const PREVIEW_Z: f32 = 0.6;

#[derive(Resource)]
pub struct RibbonMaterials {
    pub bound: Handle<ColorMaterial>,
    pub preview: Handle<ColorMaterial>,
}

pub fn setup_ribbon_materials(
    mut commands: Commands,
    config: Res<TetherConfig>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.insert_resource(RibbonMaterials {
        bound: materials.add(ColorMaterial::from(config.ribbon_color())),
        preview: materials.add(ColorMaterial::from(config.preview_color())),
    });
}

/// Spawns a mesh entity per new connection and despawns those whose
/// connection is gone.
pub fn sync_connection_ribbons_system(
    graph: Res<ConnectionGraph>,
    materials: Res<RibbonMaterials>,
    existing: Query<(Entity, &ConnectionRibbon)>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !graph.is_changed() {
        return;
    }

    let mut rendered: Vec<ConnectionId> = Vec::new();
    for (entity, ribbon) in &existing {
        if graph.contains(ribbon.0) {
            rendered.push(ribbon.0);
        } else {
            commands.entity(entity).despawn();
        }
    }

    for (id, connection) in graph.iter() {
        if rendered.contains(&id) {
            continue;
        }
        commands.spawn((
            ConnectionRibbon(id),
            Mesh2d(meshes.add(connection.ribbon().to_mesh())),
            MeshMaterial2d(materials.bound.clone()),
            Transform::from_xyz(0.0, 0.0, RIBBON_Z),
        ));
    }
}

/// One preview entity while dragging, none otherwise.
pub fn sync_preview_ribbon_system(
    controller: Res<ConnectionDragController>,
    materials: Res<RibbonMaterials>,
    mut existing: Query<(Entity, &mut Mesh2d), With<PreviewRibbon>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !controller.is_changed() {
        return;
    }

    let Some(preview) = controller.preview() else {
        for (entity, _) in &existing {
            commands.entity(entity).despawn();
        }
        return;
    };

    // Replacing the handle drops the previous frame's mesh asset.
    let handle = meshes.add(preview.to_mesh());
    if let Some((_, mut mesh)) = existing.iter_mut().next() {
        mesh.0 = handle;
    } else {
        commands.spawn((
            PreviewRibbon,
            Mesh2d(handle),
            MeshMaterial2d(materials.preview.clone()),
            Transform::from_xyz(0.0, 0.0, PREVIEW_Z),
        ));
    }
}
