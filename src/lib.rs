// src/lib.rs
//! Woodland
//!
//! A first-person walk through a moonlit forest clearing, rendered with wgpu
//! and winit: procedurally scattered trees, grass, mushrooms and firewood lit
//! by a sun, five point lights and a camera-mounted flashlight.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod performance;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{AppContext, WoodlandApp};
pub use config::AppConfig;
