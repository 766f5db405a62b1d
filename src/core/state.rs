//! Construction mode state machine.

use bevy::prelude::*;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ConstructionMode {
    /// Pointer input does not reach the connection controller.
    None,
    #[default]
    Connection,
}

impl ConstructionMode {
    pub fn toggled(&self) -> Self {
        match self {
            ConstructionMode::None => ConstructionMode::Connection,
            ConstructionMode::Connection => ConstructionMode::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConstructionMode::None => "none",
            ConstructionMode::Connection => "connection",
        }
    }
}
