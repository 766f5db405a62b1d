use bevy::color::Srgba;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::connection::drag::DragSettings;
use crate::connection::point::ConnectionType;
use crate::connection::ribbon::RibbonSettings;

/// Application configuration loaded from `~/.tetherrc`.
#[derive(Debug, Clone, Serialize, Deserialize, Resource)]
pub struct TetherConfig {
    /// Clear color in hex format (e.g., "#1e1e2e").
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Pointer-to-point radius for highlighting and committing.
    #[serde(default = "default_snap_distance")]
    pub snap_distance: f32,
    #[serde(default = "default_ribbon_resolution")]
    pub ribbon_resolution: usize,
    #[serde(default = "default_ribbon_half_width")]
    pub ribbon_half_width: f32,
    /// Degrees per Q/E press.
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_highlight_scale")]
    pub highlight_scale: f32,
    #[serde(default = "default_input_color")]
    pub input_color: String,
    #[serde(default = "default_output_color")]
    pub output_color: String,
    #[serde(default = "default_bidirectional_color")]
    pub bidirectional_color: String,
    #[serde(default = "default_ribbon_color")]
    pub ribbon_color: String,
    #[serde(default = "default_preview_color")]
    pub preview_color: String,
    /// World units per screen pixel at startup.
    #[serde(default = "default_world_scale")]
    pub world_scale: f32,
}

fn default_background_color() -> String { "#1e1e2e".to_string() }
fn default_snap_distance() -> f32 { crate::connection::drag::DEFAULT_SNAP_DISTANCE }
fn default_ribbon_resolution() -> usize { crate::connection::ribbon::DEFAULT_RESOLUTION }
fn default_ribbon_half_width() -> f32 { crate::connection::ribbon::DEFAULT_HALF_WIDTH }
fn default_rotation_speed() -> f32 { 5.0 }
fn default_highlight_scale() -> f32 { 1.5 }
fn default_input_color() -> String { "#ff0000".to_string() }
fn default_output_color() -> String { "#00ff00".to_string() }
fn default_bidirectional_color() -> String { "#0000ff".to_string() }
fn default_ribbon_color() -> String { "#cdd6f4".to_string() } // Catppuccin Mocha Text
fn default_preview_color() -> String { "#f9e2af".to_string() } // Catppuccin Mocha Yellow
fn default_world_scale() -> f32 { 0.01 }

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            snap_distance: default_snap_distance(),
            ribbon_resolution: default_ribbon_resolution(),
            ribbon_half_width: default_ribbon_half_width(),
            rotation_speed: default_rotation_speed(),
            highlight_scale: default_highlight_scale(),
            input_color: default_input_color(),
            output_color: default_output_color(),
            bidirectional_color: default_bidirectional_color(),
            ribbon_color: default_ribbon_color(),
            preview_color: default_preview_color(),
            world_scale: default_world_scale(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

fn hex_or(hex: &str, fallback: Srgba) -> Color {
    Srgba::hex(hex).unwrap_or(fallback).into()
}

impl TetherConfig {
    pub fn bg_color(&self) -> Color {
        hex_or(&self.background_color, Srgba::new(0.12, 0.12, 0.18, 1.0))
    }

    pub fn point_color(&self, point_type: ConnectionType) -> Color {
        match point_type {
            ConnectionType::Input => hex_or(&self.input_color, Srgba::new(1.0, 0.0, 0.0, 1.0)),
            ConnectionType::Output => hex_or(&self.output_color, Srgba::new(0.0, 1.0, 0.0, 1.0)),
            ConnectionType::Bidirectional => hex_or(&self.bidirectional_color, Srgba::new(0.0, 0.0, 1.0, 1.0)),
        }
    }

    pub fn ribbon_color(&self) -> Color {
        hex_or(&self.ribbon_color, Srgba::new(0.8, 0.84, 0.96, 1.0))
    }

    pub fn preview_color(&self) -> Color {
        hex_or(&self.preview_color, Srgba::new(0.98, 0.89, 0.69, 1.0))
    }

    pub fn ribbon_settings(&self) -> RibbonSettings {
        RibbonSettings {
            resolution: self.ribbon_resolution,
            half_width: self.ribbon_half_width,
        }
    }

    pub fn drag_settings(&self) -> DragSettings {
        DragSettings {
            snap_distance: self.snap_distance,
            ribbon: self.ribbon_settings(),
        }
    }
}

/// Reads a config file. `Ok(None)` when the file does not exist.
pub fn load_config_from(path: &Path) -> Result<Option<TetherConfig>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Attempts to load the configuration from `~/.tetherrc`.
/// Falls back to default if the file is missing or invalid.
pub fn load_config() -> TetherConfig {
    let Ok(home) = env::var("HOME") else {
        return TetherConfig::default();
    };
    match load_config_from(&PathBuf::from(home).join(".tetherrc")) {
        Ok(Some(config)) => config,
        Ok(None) => TetherConfig::default(),
        Err(err) => {
            // Runs before the log plugin exists.
            eprintln!("[CONFIG] {}; using defaults", err);
            TetherConfig::default()
        }
    }
}
