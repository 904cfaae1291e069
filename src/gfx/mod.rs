//! # Graphics Module
//!
//! Camera, lights, scene content and the wgpu renderer.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - first-person camera with keyboard and mouse controls
//! - **Lighting** ([`lighting`]) - directional, point and spot lights and the scene's rig
//! - **Scene Content** ([`scene`]) - fixed models, scattered instances and their draw order
//! - **Shading** ([`shading`]) - named uniforms of the lighting program and frame recording
//! - **Rendering Pipeline** ([`rendering`]) - per-frame draw sequence and the GPU engine
//! - **Resource Management** ([`resources`]) - meshes, textures and materials
//!
//! Each frame, [`rendering::render_frame`] writes the camera, the light rig and
//! one draw per entity into a [`shading::FrameRecorder`], which
//! [`RenderEngine`] then uploads and replays.

pub mod camera;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shading;

// Re-export commonly used types
pub use camera::FpsCamera;
pub use rendering::render_engine::RenderEngine;
