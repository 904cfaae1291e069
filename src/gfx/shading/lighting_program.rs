use super::uniform_block::{StructLayout, UniformKind, UniformLayout, UniformLayoutBuilder};

/// Size of the `pointLights` array in the lighting shader.
pub const POINT_LIGHT_COUNT: usize = 5;

/// The only sampler uniform the lighting shader declares.
pub const DIFFUSE_MAP: &str = "material.diffuseMap";

/// WGSL source of the multi-light Blinn-Phong program.
pub const LIGHTING_SHADER: &str =
    include_str!("../rendering/lighting_dir_point_spot.wgsl");

fn directional_light() -> StructLayout {
    StructLayout::new()
        .field("direction", UniformKind::Vec3)
        .field("ambient", UniformKind::Vec3)
        .field("diffuse", UniformKind::Vec3)
        .field("specular", UniformKind::Vec3)
}

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

fn spot_light() -> StructLayout {
    StructLayout::new()
        .field("ambient", UniformKind::Vec3)
        .field("diffuse", UniformKind::Vec3)
        .field("specular", UniformKind::Vec3)
        .field("position", UniformKind::Vec3)
        .field("direction", UniformKind::Vec3)
        .field("cosInnerCone", UniformKind::F32)
        .field("cosOuterCone", UniformKind::F32)
        .field("constant", UniformKind::F32)
        .field("linear", UniformKind::F32)
        .field("exponent", UniformKind::F32)
        .field("on", UniformKind::Bool)
}

fn material() -> StructLayout {
    StructLayout::new()
        .field("ambient", UniformKind::Vec3)
        .field("specular", UniformKind::Vec3)
        .field("shininess", UniformKind::F32)
}

/// Per-frame block: camera matrices and the whole light rig. Must match
/// `SceneUniforms` in the WGSL source field for field.
pub fn scene_layout() -> UniformLayout {
    UniformLayoutBuilder::new("scene")
        .scalar("view", UniformKind::Mat4)
        .scalar("projection", UniformKind::Mat4)
        .scalar("viewPos", UniformKind::Vec3)
        .structure("sunLight", &directional_light())
        .array("pointLights", &point_light(), POINT_LIGHT_COUNT)
        .structure("spotLight", &spot_light())
        .build()
}

/// Per-draw block: model matrix, material and the inverse-transpose of the
/// model matrix for normals. Must match `ObjectUniforms`.
pub fn object_layout() -> UniformLayout {
    UniformLayoutBuilder::new("object")
        .scalar("model", UniformKind::Mat4)
        .structure("material", &material())
        .scalar("normalMatrix", UniformKind::Mat4)
        .build()
}

/// Both block layouts of the lighting program.
#[derive(Debug, Clone)]
pub struct LightingProgram {
    pub scene: UniformLayout,
    pub object: UniformLayout,
}

impl LightingProgram {
    pub fn new() -> Self {
        Self {
            scene: scene_layout(),
            object: object_layout(),
        }
    }

    /// Texture unit a sampler uniform may read from, if it exists
    pub fn sampler_unit(name: &str) -> Option<u32> {
        (name == DIFFUSE_MAP).then_some(0)
    }
}

impl Default for LightingProgram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_block_offsets() {
        let scene = scene_layout();
        assert_eq!(scene.offset_of("view"), Some(0));
        assert_eq!(scene.offset_of("projection"), Some(64));
        assert_eq!(scene.offset_of("viewPos"), Some(128));
        assert_eq!(scene.offset_of("sunLight.direction"), Some(144));
        assert_eq!(scene.offset_of("sunLight.specular"), Some(192));
        assert_eq!(scene.offset_of("pointLights[0].ambient"), Some(208));
        assert_eq!(scene.offset_of("pointLights[4].exponent"), Some(208 + 4 * 80 + 68));
        assert_eq!(scene.offset_of("spotLight.ambient"), Some(608));
        assert_eq!(scene.offset_of("spotLight.direction"), Some(672));
        assert_eq!(scene.offset_of("spotLight.cosInnerCone"), Some(684));
        assert_eq!(scene.offset_of("spotLight.on"), Some(704));
        assert_eq!(scene.size(), 720);
    }

    #[test]
    fn test_object_block_offsets() {
        let object = object_layout();
        assert_eq!(object.offset_of("model"), Some(0));
        assert_eq!(object.offset_of("material.ambient"), Some(64));
        assert_eq!(object.offset_of("material.specular"), Some(80));
        assert_eq!(object.offset_of("material.shininess"), Some(92));
        assert_eq!(object.offset_of("normalMatrix"), Some(96));
        assert_eq!(object.size(), 160);
    }

    #[test]
    fn test_point_light_names_are_indexed() {
        let scene = scene_layout();
        for i in 0..POINT_LIGHT_COUNT {
            for field in ["ambient", "diffuse", "specular", "position", "constant", "linear", "exponent"] {
                assert!(scene.contains(&format!("pointLights[{i}].{field}")));
            }
        }
        assert!(!scene.contains("pointLights[5].ambient"));
    }

    #[test]
    fn test_shader_declares_every_struct_field() {
        for field in ["cosInnerCone", "cosOuterCone", "exponent", "shininess", "viewPos", "sunLight"] {
            assert!(LIGHTING_SHADER.contains(field), "missing {field}");
        }
        assert_eq!(LightingProgram::sampler_unit(DIFFUSE_MAP), Some(0));
        assert_eq!(LightingProgram::sampler_unit("material.specularMap"), None);
    }
}
