// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The frame renderer decides what is drawn each frame; the render engine
//! owns the GPU and replays the recorded frame.

pub mod frame_renderer;
pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use frame_renderer::{draw_instance, render_frame};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::{RenderEngine, SurfaceErrorAction};
