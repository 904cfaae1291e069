//! Blinn-Phong material parameters
//!
//! The diffuse colour comes from the bound texture, so a material only carries
//! the ambient and specular tints plus the shininess exponent. Materials are
//! plain values: every draw pushes its category's material again.

use cgmath::Vector3;

use crate::gfx::shading::{lighting_program::DIFFUSE_MAP, ShadingStage, ShadingStageExt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.1, 0.1, 0.1),
            specular: Vector3::new(0.8, 0.8, 0.8),
            shininess: 32.0,
        }
    }
}

impl Material {
    pub fn with_specular(mut self, value: f32) -> Self {
        self.specular = Vector3::new(value, value, value);
        self
    }

    /// Writes `material.*` and points the diffuse sampler at `unit`.
    pub fn push_uniforms(&self, stage: &mut impl ShadingStage, unit: u32) {
        stage.uniform("material.ambient", self.ambient);
        stage.uniform("material.specular", self.specular);
        stage.uniform("material.shininess", self.shininess);
        stage.sampler(DIFFUSE_MAP, unit);
    }
}
