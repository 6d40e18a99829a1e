//! Configuration module for the conversation renderer.
//!
//! Provides CLI argument parsing and configuration management.

#[allow(clippy::module_inception)]
mod config;

pub use config::{AppConfig, ClipFormat, MAX_GAP_MS, TrackFormat};
