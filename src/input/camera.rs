//! Camera controls. Scales are relative to the configured world scale so a
//! fresh camera sits at zoom 1.0.

use bevy::prelude::*;

use crate::core::components::MainCamera;
use crate::core::config::TetherConfig;

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 10.0;

fn clamp_scale(scale: f32, world_scale: f32) -> f32 {
    scale.clamp(world_scale * MIN_ZOOM, world_scale * MAX_ZOOM)
}

/// Scroll-wheel zoom: adjusts the orthographic scale of the main camera.
pub fn camera_zoom_system(
    config: Res<TetherConfig>,
    mut mouse_wheel: MessageReader<bevy::input::mouse::MouseWheel>,
    mut proj_q: Query<&mut Projection, With<MainCamera>>,
) {
    let Ok(mut proj) = proj_q.single_mut() else {
        return;
    };
    for event in mouse_wheel.read() {
        let Projection::Orthographic(ortho) = proj.as_mut() else {
            continue;
        };
        let delta = match event.unit {
            bevy::input::mouse::MouseScrollUnit::Line => event.y * 0.10,
            bevy::input::mouse::MouseScrollUnit::Pixel => event.y * 0.001,
        };
        ortho.scale = clamp_scale(ortho.scale * (1.0 - delta), config.world_scale);
    }
}

/// Keyboard zoom: `=` / `+` in, `-` out, one step per press.
pub fn camera_zoom_keys_system(
    config: Res<TetherConfig>,
    keys: Res<ButtonInput<KeyCode>>,
    mut proj_q: Query<&mut Projection, With<MainCamera>>,
) {
    let zoom_in = keys.just_pressed(KeyCode::Equal) || keys.just_pressed(KeyCode::NumpadAdd);
    let zoom_out = keys.just_pressed(KeyCode::Minus) || keys.just_pressed(KeyCode::NumpadSubtract);
    if !zoom_in && !zoom_out {
        return;
    }
    let Ok(mut proj) = proj_q.single_mut() else {
        return;
    };
    let Projection::Orthographic(ortho) = proj.as_mut() else {
        return;
    };
    let factor = if zoom_in { 0.8 } else { 1.25 };
    ortho.scale = clamp_scale(ortho.scale * factor, config.world_scale);
}

/// Middle-click drag pans. One pixel of mouse movement moves the view one pixel.
pub fn camera_pan_system(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<bevy::input::mouse::MouseMotion>,
    mut camera_q: Query<(&mut Transform, &Projection), With<MainCamera>>,
) {
    if !mouse_buttons.pressed(MouseButton::Middle) {
        for _ in mouse_motion.read() {}
        return;
    }

    let Ok((mut cam_transform, projection)) = camera_q.single_mut() else {
        return;
    };
    let scale = match projection {
        Projection::Orthographic(ortho) => ortho.scale,
        _ => 1.0,
    };

    for motion in mouse_motion.read() {
        cam_transform.translation.x -= motion.delta.x * scale;
        cam_transform.translation.y += motion.delta.y * scale;
    }
}

const PAN_SPEED: f32 = 400.0; // pixels per second

/// Arrow keys pan the camera while held.
pub fn camera_pan_keys_system(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera_q: Query<(&mut Transform, &Projection), With<MainCamera>>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if dir == Vec2::ZERO {
        return;
    }

    let Ok((mut cam_transform, projection)) = camera_q.single_mut() else {
        return;
    };
    let scale = match projection {
        Projection::Orthographic(ortho) => ortho.scale,
        _ => 1.0,
    };
    let delta = dir * PAN_SPEED * time.delta_secs() * scale;
    cam_transform.translation += delta.extend(0.0);
}
