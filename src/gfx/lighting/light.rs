use cgmath::{Deg, Point3, Vector3};

use crate::gfx::shading::{ShadingStage, ShadingStageExt};

/// Ambient, diffuse and specular colour of a light, nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColor {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl LightColor {
    pub fn new(ambient: Vector3<f32>, diffuse: Vector3<f32>, specular: Vector3<f32>) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    /// Grey light with the same value in every channel of each term
    pub fn grey(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self::new(
            Vector3::new(ambient, ambient, ambient),
            Vector3::new(diffuse, diffuse, diffuse),
            Vector3::new(specular, specular, specular),
        )
    }

    fn push(&self, stage: &mut impl ShadingStage, prefix: &str) {
        stage.uniform(&format!("{prefix}.ambient"), self.ambient);
        stage.uniform(&format!("{prefix}.diffuse"), self.diffuse);
        stage.uniform(&format!("{prefix}.specular"), self.specular);
    }
}

/// Falloff `1 / (constant + linear * d + exponent * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }

    fn push(&self, stage: &mut impl ShadingStage, prefix: &str) {
        stage.uniform(&format!("{prefix}.constant"), self.constant);
        stage.uniform(&format!("{prefix}.linear"), self.linear);
        stage.uniform(&format!("{prefix}.exponent"), self.exponent);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: LightColor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: LightColor,
    pub attenuation: Attenuation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub color: LightColor,
    pub attenuation: Attenuation,
    /// Cosine of the full-intensity half angle
    pub cos_inner_cone: f32,
    /// Cosine of the half angle where intensity reaches zero
    pub cos_outer_cone: f32,
    pub on: bool,
}

impl SpotLight {
    pub fn with_cone(mut self, inner: Deg<f32>, outer: Deg<f32>) -> Self {
        self.cos_inner_cone = cgmath::Angle::cos(inner);
        self.cos_outer_cone = cgmath::Angle::cos(outer);
        self
    }
}

/// A light of any supported type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    /// Writes every field of the light under `prefix`, e.g. `pointLights[3]`.
    pub fn push_uniforms(&self, stage: &mut impl ShadingStage, prefix: &str) {
        match self {
            Light::Directional(light) => {
                stage.uniform(&format!("{prefix}.direction"), light.direction);
                light.color.push(stage, prefix);
            }
            Light::Point(light) => {
                light.color.push(stage, prefix);
                stage.uniform(&format!("{prefix}.position"), light.position);
                light.attenuation.push(stage, prefix);
            }
            Light::Spot(light) => {
                light.color.push(stage, prefix);
                stage.uniform(&format!("{prefix}.position"), light.position);
                stage.uniform(&format!("{prefix}.direction"), light.direction);
                stage.uniform(&format!("{prefix}.cosInnerCone"), light.cos_inner_cone);
                stage.uniform(&format!("{prefix}.cosOuterCone"), light.cos_outer_cone);
                light.attenuation.push(stage, prefix);
                stage.uniform(&format!("{prefix}.on"), light.on);
            }
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::shading::{FrameRecorder, LightingProgram, UniformValue};

    fn flashlight() -> SpotLight {
        SpotLight {
            position: Point3::new(0.0, 2.0, 0.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            color: LightColor::grey(0.8, 0.8, 1.0),
            attenuation: Attenuation::new(1.0, 0.01, 0.001),
            cos_inner_cone: 0.0,
            cos_outer_cone: 0.0,
            on: true,
        }
        .with_cone(Deg(15.0), Deg(20.0))
    }

    #[test]
    fn test_cone_stores_cosines() {
        let spot = flashlight();
        assert!((spot.cos_inner_cone - 15f32.to_radians().cos()).abs() < 1e-6);
        assert!((spot.cos_outer_cone - 20f32.to_radians().cos()).abs() < 1e-6);
        assert!(spot.cos_inner_cone > spot.cos_outer_cone);
    }

    #[test]
    fn test_spot_writes_every_field_under_prefix() {
        let spot = flashlight();
        let mut frame = FrameRecorder::new(&LightingProgram::new(), 256);
        Light::from(spot).push_uniforms(&mut frame, "spotLight");

        assert_eq!(
            frame.scene_value("spotLight.position"),
            Some(UniformValue::Vec3(Vector3::new(0.0, 2.0, 0.0)))
        );
        assert_eq!(
            frame.scene_value("spotLight.cosOuterCone"),
            Some(UniformValue::F32(spot.cos_outer_cone))
        );
        assert_eq!(frame.scene_value("spotLight.exponent"), Some(UniformValue::F32(0.001)));
        assert_eq!(frame.scene_value("spotLight.on"), Some(UniformValue::Bool(true)));
    }

    #[test]
    fn test_point_light_uses_indexed_prefix() {
        let light = PointLight {
            position: Point3::new(50.0, 5.0, 15.0),
            color: LightColor::new(
                Vector3::new(0.9, 0.9, 0.9),
                Vector3::new(0.8, 0.5, 0.5),
                Vector3::new(0.2, 0.2, 0.2),
            ),
            attenuation: Attenuation::new(1.0, 0.001, 0.001),
        };
        let mut frame = FrameRecorder::new(&LightingProgram::new(), 256);
        Light::from(light).push_uniforms(&mut frame, "pointLights[3]");

        assert_eq!(
            frame.scene_value("pointLights[3].diffuse"),
            Some(UniformValue::Vec3(Vector3::new(0.8, 0.5, 0.5)))
        );
        assert_eq!(frame.scene_value("pointLights[3].linear"), Some(UniformValue::F32(0.001)));
        assert_eq!(
            frame.scene_value("pointLights[2].position"),
            Some(UniformValue::Vec3(Vector3::new(0.0, 0.0, 0.0)))
        );
    }
}
