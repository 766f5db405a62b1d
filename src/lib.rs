//! Tether: drag-to-connect ribbons between typed building connection points.

pub mod connection;
pub mod core;
pub mod input;
pub mod render;
pub mod ui;

use bevy::prelude::*;
use bevy_egui::{
    input::{egui_wants_any_keyboard_input, egui_wants_any_pointer_input},
    EguiPlugin, EguiPrimaryContextPass,
};

use connection::{ConnectionPlugin, ConnectionSet};
use crate::core::components::MainCamera;
use crate::core::config::TetherConfig;
use crate::core::state::ConstructionMode;

use input::camera::{
    camera_pan_keys_system, camera_pan_system, camera_zoom_keys_system, camera_zoom_system,
};
use input::pointer::{pointer_input_system, toggle_mode_system};
use render::points::{draw_connection_points_system, draw_pointer_system};
use render::ribbons::{
    setup_ribbon_materials, sync_connection_ribbons_system, sync_preview_ribbon_system,
};

/// Build and run the Tether app.
pub fn run() {
    let app_config = crate::core::config::load_config();
    let drag_settings = app_config.drag_settings();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tether".to_string(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(app_config.bg_color()))
        .insert_resource(app_config)
        .add_plugins(EguiPlugin::default())
        .add_plugins(ConnectionPlugin {
            drag: drag_settings,
        })
        .init_state::<ConstructionMode>()
        .add_systems(
            Startup,
            (setup_scene, setup_gizmo_line_width, setup_ribbon_materials),
        )
        .add_systems(
            Update,
            (
                toggle_mode_system.run_if(not(egui_wants_any_keyboard_input)),
                pointer_input_system
                    .run_if(in_state(ConstructionMode::Connection))
                    .run_if(not(egui_wants_any_pointer_input)),
            )
                .chain()
                .in_set(ConnectionSet::Input),
        )
        .add_systems(
            Update,
            (
                camera_zoom_system.run_if(not(egui_wants_any_pointer_input)),
                camera_zoom_keys_system.run_if(not(egui_wants_any_keyboard_input)),
                camera_pan_system,
                camera_pan_keys_system.run_if(not(egui_wants_any_keyboard_input)),
            ),
        )
        .add_systems(
            Update,
            (
                sync_connection_ribbons_system,
                sync_preview_ribbon_system,
                draw_connection_points_system,
                draw_pointer_system.run_if(in_state(ConstructionMode::Connection)),
            )
                .in_set(ConnectionSet::Render),
        )
        .add_systems(EguiPrimaryContextPass, ui::hud::hud_system)
        .run();
}

fn setup_gizmo_line_width(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = 2.0;
}

fn setup_scene(mut commands: Commands, config: Res<TetherConfig>) {
    commands.spawn((
        Camera2d,
        MainCamera,
        Projection::Orthographic(OrthographicProjection {
            scale: config.world_scale,
            ..OrthographicProjection::default_2d()
        }),
    ));
    crate::core::helpers::spawn_demo_scene(&mut commands);
}
