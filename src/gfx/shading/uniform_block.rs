//! Named uniform blocks
//!
//! wgpu has no notion of uniform locations, so the lighting program's blocks
//! are described on the CPU: each leaf field gets a dotted name
//! (`pointLights[2].position`, `material.shininess`, ...) and the byte offset
//! WGSL assigns it in the uniform address space. Values are then written by
//! name into a plain byte buffer that is uploaded as-is.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3, Vector3};

use crate::error::UniformError;

/// Types that may appear in a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    F32,
    U32,
    /// Stored as `u32`; WGSL forbids `bool` in uniform buffers
    Bool,
    Vec3,
    Mat4,
}

impl UniformKind {
    pub const fn size(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::U32 | UniformKind::Bool => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Mat4 => 64,
        }
    }

    pub const fn align(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::U32 | UniformKind::Bool => 4,
            UniformKind::Vec3 | UniformKind::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    U32(u32),
    Bool(bool),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::F32(_) => UniformKind::F32,
            UniformValue::U32(_) => UniformKind::U32,
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write(&self, dst: &mut [u8]) {
        match self {
            UniformValue::F32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::U32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Bool(v) => dst.copy_from_slice(bytemuck::bytes_of(&(*v as u32))),
            UniformValue::Vec3(v) => {
                let v: [f32; 3] = (*v).into();
                dst.copy_from_slice(bytemuck::cast_slice(&v));
            }
            UniformValue::Mat4(m) => {
                let m: [[f32; 4]; 4] = (*m).into();
                dst.copy_from_slice(bytemuck::cast_slice(&m));
            }
        }
    }

    pub(crate) fn read(kind: UniformKind, src: &[u8]) -> Self {
        let floats: Vec<f32> = src
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let word = u32::from_ne_bytes([src[0], src[1], src[2], src[3]]);

        match kind {
            UniformKind::F32 => UniformValue::F32(floats[0]),
            UniformKind::U32 => UniformValue::U32(word),
            UniformKind::Bool => UniformValue::Bool(word != 0),
            UniformKind::Vec3 => UniformValue::Vec3(Vector3::new(floats[0], floats[1], floats[2])),
            UniformKind::Mat4 => UniformValue::Mat4(Matrix4::new(
                floats[0], floats[1], floats[2], floats[3], floats[4], floats[5], floats[6],
                floats[7], floats[8], floats[9], floats[10], floats[11], floats[12], floats[13],
                floats[14], floats[15],
            )),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(v: Vector3<f32>) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Point3<f32>> for UniformValue {
    fn from(p: Point3<f32>) -> Self {
        UniformValue::Vec3(Vector3::new(p.x, p.y, p.z))
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(m: Matrix4<f32>) -> Self {
        UniformValue::Mat4(m)
    }
}

fn round_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Field list of a WGSL struct, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct StructLayout {
    fields: Vec<(String, UniformKind)>,
}

impl StructLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, kind: UniformKind) -> Self {
        self.fields.push((name.to_string(), kind));
        self
    }

    /// Member offsets plus (align, size) of the struct in the uniform address space
    fn resolve(&self) -> (Vec<(&str, usize, UniformKind)>, usize, usize) {
        let mut offset = 0;
        let mut align = 16;
        let mut members = Vec::with_capacity(self.fields.len());

        for (name, kind) in &self.fields {
            offset = round_up(offset, kind.align());
            members.push((name.as_str(), offset, *kind));
            offset += kind.size();
            align = align.max(kind.align());
        }

        (members, align, round_up(offset, align))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UniformSlot {
    offset: usize,
    kind: UniformKind,
}

/// Resolved offsets of every leaf field of a uniform block.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    slots: HashMap<String, UniformSlot>,
    size: usize,
}

impl UniformLayout {
    /// Block size in bytes, already rounded to 16
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.slots.get(name).map(|slot| slot.offset)
    }

    pub fn kind_of(&self, name: &str) -> Option<UniformKind> {
        self.slots.get(name).map(|slot| slot.kind)
    }

    fn slot(&self, name: &str, kind: UniformKind) -> Result<UniformSlot, UniformError> {
        let slot = self
            .slots
            .get(name)
            .copied()
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;

        if slot.kind != kind {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: slot.kind,
                found: kind,
            });
        }
        Ok(slot)
    }
}

/// Builds a [`UniformLayout`] member by member, in WGSL declaration order.
pub struct UniformLayoutBuilder {
    label: &'static str,
    slots: HashMap<String, UniformSlot>,
    offset: usize,
}

impl UniformLayoutBuilder {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slots: HashMap::new(),
            offset: 0,
        }
    }

    pub fn scalar(mut self, name: &str, kind: UniformKind) -> Self {
        self.offset = round_up(self.offset, kind.align());
        self.insert(name.to_string(), self.offset, kind);
        self.offset += kind.size();
        self
    }

    pub fn structure(mut self, name: &str, layout: &StructLayout) -> Self {
        let (members, align, size) = layout.resolve();
        self.offset = round_up(self.offset, align);
        for (field, offset, kind) in members {
            self.insert(format!("{name}.{field}"), self.offset + offset, kind);
        }
        self.offset += size;
        self
    }

    pub fn array(mut self, name: &str, layout: &StructLayout, len: usize) -> Self {
        let (members, align, size) = layout.resolve();
        let stride = round_up(size, 16);
        self.offset = round_up(self.offset, align);
        for i in 0..len {
            let base = self.offset + i * stride;
            for (field, offset, kind) in &members {
                self.insert(format!("{name}[{i}].{field}"), base + offset, *kind);
            }
        }
        self.offset += stride * len;
        self
    }

    pub fn build(self) -> UniformLayout {
        UniformLayout {
            slots: self.slots,
            size: round_up(self.offset.max(1), 16),
        }
    }

    fn insert(&mut self, name: String, offset: usize, kind: UniformKind) {
        if self.slots.insert(name.clone(), UniformSlot { offset, kind }).is_some() {
            log::warn!("uniform '{name}' declared twice in {}", self.label);
        }
    }
}

/// CPU copy of one uniform block, written by name.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size()];
        Self { layout, data }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        let value = value.into();
        let slot = self.layout.slot(name, value.kind())?;
        value.write(&mut self.data[slot.offset..slot.offset + slot.kind.size()]);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let slot = self.layout.slots.get(name)?;
        Some(UniformValue::read(
            slot.kind,
            &self.data[slot.offset..slot.offset + slot.kind.size()],
        ))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    fn point_light() -> StructLayout {
        StructLayout::new()
            .field("ambient", UniformKind::Vec3)
            .field("diffuse", UniformKind::Vec3)
            .field("specular", UniformKind::Vec3)
            .field("position", UniformKind::Vec3)
            .field("constant", UniformKind::F32)
            .field("linear", UniformKind::F32)
            .field("exponent", UniformKind::F32)
    }

    #[test]
    fn test_vec3_followed_by_scalar_packs_into_padding() {
        let layout = UniformLayoutBuilder::new("test")
            .array("pointLights", &point_light(), 2)
            .build();

        assert_eq!(layout.offset_of("pointLights[0].position"), Some(48));
        assert_eq!(layout.offset_of("pointLights[0].constant"), Some(60));
        assert_eq!(layout.offset_of("pointLights[0].exponent"), Some(68));
        assert_eq!(layout.offset_of("pointLights[1].ambient"), Some(80));
        assert_eq!(layout.size(), 160);
    }

    #[test]
    fn test_struct_after_scalar_is_aligned() {
        let layout = UniformLayoutBuilder::new("test")
            .scalar("viewPos", UniformKind::Vec3)
            .structure("light", &point_light())
            .scalar("tail", UniformKind::F32)
            .build();

        assert_eq!(layout.offset_of("viewPos"), Some(0));
        assert_eq!(layout.offset_of("light.ambient"), Some(16));
        assert_eq!(layout.offset_of("tail"), Some(96));
        assert_eq!(layout.size(), 112);
    }

    #[test]
    fn test_set_and_get_by_name() {
        let layout = UniformLayoutBuilder::new("test")
            .scalar("model", UniformKind::Mat4)
            .scalar("on", UniformKind::Bool)
            .scalar("shininess", UniformKind::F32)
            .build();
        let mut block = UniformBlock::new(layout);

        let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        block.set("model", model).unwrap();
        block.set("on", true).unwrap();
        block.set("shininess", 32.0f32).unwrap();

        assert_eq!(block.get("model"), Some(UniformValue::Mat4(model)));
        assert_eq!(block.get("on"), Some(UniformValue::Bool(true)));
        assert_eq!(block.get("shininess"), Some(UniformValue::F32(32.0)));

        // bools land on the GPU as a full u32
        assert_eq!(&block.as_bytes()[64..68], &1u32.to_ne_bytes());
    }

    #[test]
    fn test_unknown_and_mismatched_names_are_errors() {
        let layout = UniformLayoutBuilder::new("test")
            .scalar("model", UniformKind::Mat4)
            .build();
        let mut block = UniformBlock::new(layout);

        assert_eq!(
            block.set("modle", Matrix4::identity()),
            Err(UniformError::Unknown("modle".to_string()))
        );
        assert_eq!(
            block.set("model", 1.0f32),
            Err(UniformError::TypeMismatch {
                name: "model".to_string(),
                expected: UniformKind::Mat4,
                found: UniformKind::F32,
            })
        );
        assert!(block.as_bytes().iter().all(|b| *b == 0));
    }
}
