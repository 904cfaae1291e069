use crate::{
    error::UniformError,
    gfx::resources::asset_library::{MeshHandle, TextureHandle},
};

use super::uniform_block::UniformValue;

/// Everything the frame renderer needs from the shading stage.
///
/// Uniforms are addressed by their dotted names in the lighting program.
/// Textures are bound to numbered units, and sampler uniforms choose which
/// unit they read from. `draw` submits a mesh with whatever uniforms and
/// textures are current at that point.
pub trait ShadingStage {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError>;

    fn set_sampler(&mut self, name: &str, unit: u32) -> Result<(), UniformError>;

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    fn unbind_texture(&mut self, unit: u32);

    fn draw(&mut self, mesh: MeshHandle);
}

/// Extension helpers over [`ShadingStage`].
pub trait ShadingStageExt: ShadingStage {
    /// Writes a uniform, logging instead of failing when the name or type is
    /// wrong. Only that one value is lost.
    fn uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        if let Err(e) = self.set_uniform(name, value.into()) {
            log::warn!("{e}");
        }
    }

    fn sampler(&mut self, name: &str, unit: u32) {
        if let Err(e) = self.set_sampler(name, unit) {
            log::warn!("{e}");
        }
    }
}

impl<T: ShadingStage + ?Sized> ShadingStageExt for T {}
