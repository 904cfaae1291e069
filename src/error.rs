//! Error types for startup and asset loading
//!
//! Every error here is fatal at startup. Once the render loop is running
//! the scene is fully validated and nothing on the per-frame path fails.

use std::path::PathBuf;

use crate::gfx::scene::description::Category;

/// Failures while bringing up the window and GPU context
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats for this adapter")]
    NoSurfaceFormat,
}

/// Missing or corrupt mesh/texture files
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model {path} contains no geometry")]
    EmptyModel { path: PathBuf },

    #[error("failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Scene description rejected by validation
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("category {0:?} has no model variants")]
    NoVariants(Category),

    #[error("category {category:?} places instances in pairs but count {count} is odd")]
    OddPairCount { category: Category, count: usize },

    #[error("fixed model '{0}' has a non-finite transform")]
    NonFiniteTransform(String),

    #[error("ground half-extent must be positive, got {0}")]
    EmptyGround(f32),

    #[error("category {0:?} is scattered more than once")]
    DuplicateCategory(Category),

    #[error("category {0:?} is placed by hand and cannot be scattered")]
    NotScatterable(Category),

    #[error("no loaded model for {category:?} entry {index}")]
    UnresolvedModel { category: Category, index: usize },
}

/// Failures writing a named value into a uniform block
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UniformError {
    #[error("no uniform named '{0}'")]
    Unknown(String),

    #[error("uniform '{name}' expects {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: crate::gfx::shading::UniformKind,
        found: crate::gfx::shading::UniformKind,
    },

    #[error("sampler '{name}' cannot read texture unit {unit}")]
    InvalidUnit { name: String, unit: u32 },
}
