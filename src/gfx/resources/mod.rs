// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Meshes, textures and the asset library that owns them, plus materials.

pub mod asset_library;
pub mod material;
pub mod mesh;
pub mod texture_resource;

// Re-export main types
pub use asset_library::{AssetLibrary, MeshHandle, ModelHandles, SceneAssets, TextureHandle};
pub use material::Material;
pub use texture_resource::TextureResource;
