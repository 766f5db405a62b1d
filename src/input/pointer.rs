//! Mouse/keyboard → `ConstructionInput`.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::connection::direction::Direction;
use crate::connection::systems::ConstructionInput;
use crate::core::components::MainCamera;
use crate::core::config::TetherConfig;
use crate::core::state::ConstructionMode;

/// Pointer pose in world space, as last reported to the controller.
#[derive(Resource, Debug, Default)]
pub struct PointerState {
    /// `None` while the cursor is outside the window.
    pub position: Option<Vec2>,
    pub direction: Direction,
}

fn cursor_world_pos(
    window_q: &Query<&Window, With<PrimaryWindow>>,
    camera_q: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let window = window_q.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, cam_transform) = camera_q.single().ok()?;
    camera.viewport_to_world_2d(cam_transform, cursor).ok()
}

/// Q / E rotation step for this frame, in degrees.
fn rotation_input(keys: &ButtonInput<KeyCode>, speed: f32) -> f32 {
    let mut delta = 0.0;
    if keys.just_pressed(KeyCode::KeyQ) {
        delta += speed;
    }
    if keys.just_pressed(KeyCode::KeyE) {
        delta -= speed;
    }
    delta
}

/// Reports the pointer every frame, then any place/cancel from this frame.
pub fn pointer_input_system(
    config: Res<TetherConfig>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    window_q: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut pointer: ResMut<PointerState>,
    mut inputs: MessageWriter<ConstructionInput>,
) {
    let rotation = rotation_input(&keys, config.rotation_speed);
    if rotation != 0.0 {
        pointer.direction = pointer.direction.rotated(rotation);
    }
    pointer.position = cursor_world_pos(&window_q, &camera_q);

    if keys.just_pressed(KeyCode::Escape) || mouse_buttons.just_pressed(MouseButton::Right) {
        inputs.write(ConstructionInput::Cancel);
    }

    let Some(position) = pointer.position else {
        return;
    };
    let direction = pointer.direction;
    inputs.write(ConstructionInput::PointerChanged {
        position,
        direction,
    });
    if mouse_buttons.just_pressed(MouseButton::Left) {
        inputs.write(ConstructionInput::Place {
            position,
            direction,
        });
    }
}

/// Tab toggles connection mode. Leaving it tears down any drag.
pub fn toggle_mode_system(
    keys: Res<ButtonInput<KeyCode>>,
    mode: Res<State<ConstructionMode>>,
    mut next_mode: ResMut<NextState<ConstructionMode>>,
    mut inputs: MessageWriter<ConstructionInput>,
) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }
    let next = mode.get().toggled();
    if *mode.get() == ConstructionMode::Connection {
        inputs.write(ConstructionInput::End);
    }
    info!("[INPUT] construction mode → {}", next.label());
    next_mode.set(next);
}
