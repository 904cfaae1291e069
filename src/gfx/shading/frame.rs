//! Recording shading stage
//!
//! [`FrameRecorder`] keeps the current value of every uniform of the lighting
//! program, like a bound GL program would. Each `draw` snapshots the object
//! block into a contiguous byte buffer at a fixed stride and remembers which
//! mesh and texture to use, so the render engine can upload one buffer and
//! replay the draws with dynamic offsets.

use crate::{
    error::UniformError,
    gfx::resources::asset_library::{MeshHandle, TextureHandle},
    wgpu_utils::align_to,
};

use super::{
    lighting_program::LightingProgram,
    program::ShadingStage,
    uniform_block::{UniformBlock, UniformValue},
};

/// Number of texture units the lighting program can sample from.
pub const TEXTURE_UNITS: usize = 1;

/// One recorded draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
    /// Byte offset of this draw's object block
    pub object_offset: u32,
}

pub struct FrameRecorder {
    scene: UniformBlock,
    object: UniformBlock,
    stride: usize,
    objects: Vec<u8>,
    draws: Vec<DrawCall>,
    units: [Option<TextureHandle>; TEXTURE_UNITS],
    diffuse_unit: u32,
    skipped: usize,
}

impl FrameRecorder {
    /// `alignment` is the device's minimum uniform buffer offset alignment.
    pub fn new(program: &LightingProgram, alignment: u32) -> Self {
        let stride = align_to(program.object.size() as u64, alignment as u64) as usize;
        Self {
            scene: UniformBlock::new(program.scene.clone()),
            object: UniformBlock::new(program.object.clone()),
            stride,
            objects: Vec::new(),
            draws: Vec::new(),
            units: [None; TEXTURE_UNITS],
            diffuse_unit: 0,
            skipped: 0,
        }
    }

    /// Forgets the previous frame's draws. Uniform values persist.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.draws.clear();
        self.skipped = 0;
    }

    pub fn scene_bytes(&self) -> &[u8] {
        self.scene.as_bytes()
    }

    pub fn object_bytes(&self) -> &[u8] {
        &self.objects
    }

    pub fn object_block_size(&self) -> usize {
        self.object.layout().size()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Draws dropped this frame because no texture was bound.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn scene_value(&self, name: &str) -> Option<UniformValue> {
        self.scene.get(name)
    }

    /// Object uniform as it was when draw `index` was recorded.
    pub fn object_value(&self, index: usize, name: &str) -> Option<UniformValue> {
        let layout = self.object.layout();
        let offset = self.draws.get(index)?.object_offset as usize + layout.offset_of(name)?;
        let kind = layout.kind_of(name)?;
        Some(UniformValue::read(
            kind,
            self.objects.get(offset..offset + kind.size())?,
        ))
    }
}

impl ShadingStage for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        if self.object.layout().contains(name) {
            self.object.set(name, value)
        } else {
            self.scene.set(name, value)
        }
    }

    fn set_sampler(&mut self, name: &str, unit: u32) -> Result<(), UniformError> {
        if LightingProgram::sampler_unit(name).is_none() {
            return Err(UniformError::Unknown(name.to_string()));
        }
        if unit as usize >= TEXTURE_UNITS {
            return Err(UniformError::InvalidUnit {
                name: name.to_string(),
                unit,
            });
        }
        self.diffuse_unit = unit;
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(texture),
            None => log::warn!("texture unit {unit} does not exist"),
        }
    }

    fn unbind_texture(&mut self, unit: u32) {
        if let Some(slot) = self.units.get_mut(unit as usize) {
            *slot = None;
        }
    }

    fn draw(&mut self, mesh: MeshHandle) {
        let Some(texture) = self.units[self.diffuse_unit as usize] else {
            self.skipped += 1;
            return;
        };

        let object_offset = self.objects.len() as u32;
        self.objects.extend_from_slice(self.object.as_bytes());
        self.objects.resize(object_offset as usize + self.stride, 0);
        self.draws.push(DrawCall {
            mesh,
            texture,
            object_offset,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::shading::ShadingStageExt;
    use cgmath::Vector3;

    fn recorder() -> FrameRecorder {
        FrameRecorder::new(&LightingProgram::new(), 256)
    }

    #[test]
    fn test_draws_snapshot_object_block() {
        let mut frame = recorder();
        frame.bind_texture(0, TextureHandle(3));

        frame.uniform("material.shininess", 8.0f32);
        frame.draw(MeshHandle(1));
        frame.uniform("material.shininess", 64.0f32);
        frame.draw(MeshHandle(2));

        assert_eq!(frame.stride(), 256);
        assert_eq!(frame.object_bytes().len(), 512);
        assert_eq!(
            frame.draws(),
            &[
                DrawCall {
                    mesh: MeshHandle(1),
                    texture: TextureHandle(3),
                    object_offset: 0
                },
                DrawCall {
                    mesh: MeshHandle(2),
                    texture: TextureHandle(3),
                    object_offset: 256
                },
            ]
        );
        assert_eq!(frame.object_value(0, "material.shininess"), Some(UniformValue::F32(8.0)));
        assert_eq!(frame.object_value(1, "material.shininess"), Some(UniformValue::F32(64.0)));
    }

    #[test]
    fn test_uniforms_route_to_their_block() {
        let mut frame = recorder();
        let pos = Vector3::new(1.0, 2.0, 3.0);
        frame.uniform("viewPos", pos);
        assert_eq!(frame.scene_value("viewPos"), Some(UniformValue::Vec3(pos)));

        assert_eq!(
            frame.set_uniform("nope", UniformValue::F32(1.0)),
            Err(UniformError::Unknown("nope".to_string()))
        );
        assert!(matches!(
            frame.set_uniform("material.shininess", UniformValue::Bool(true)),
            Err(UniformError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_draw_without_texture_is_skipped() {
        let mut frame = recorder();
        frame.bind_texture(0, TextureHandle(0));
        frame.unbind_texture(0);
        frame.draw(MeshHandle(0));
        assert!(frame.draws().is_empty());
        assert_eq!(frame.skipped(), 1);

        frame.reset();
        assert_eq!(frame.skipped(), 0);
    }

    #[test]
    fn test_sampler_names_and_units() {
        let mut frame = recorder();
        assert_eq!(frame.set_sampler("material.diffuseMap", 0), Ok(()));
        assert_eq!(
            frame.set_sampler("material.diffuseMap", 4),
            Err(UniformError::InvalidUnit {
                name: "material.diffuseMap".to_string(),
                unit: 4
            })
        );
        assert_eq!(
            frame.set_sampler("shadowMap", 0),
            Err(UniformError::Unknown("shadowMap".to_string()))
        );
    }

    #[test]
    fn test_reset_keeps_uniform_state() {
        let mut frame = recorder();
        frame.bind_texture(0, TextureHandle(1));
        frame.uniform("spotLight.on", true);
        frame.draw(MeshHandle(0));
        frame.reset();

        assert!(frame.draws().is_empty());
        assert!(frame.object_bytes().is_empty());
        assert_eq!(frame.scene_value("spotLight.on"), Some(UniformValue::Bool(true)));
    }
}
