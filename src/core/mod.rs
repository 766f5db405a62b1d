//! Core types, resources, and utilities shared across the application.

pub mod components;
pub mod config;
pub mod helpers;
pub mod state;
