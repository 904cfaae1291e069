use cgmath::{Deg, InnerSpace, Point3, Vector3};

use super::light::{Attenuation, DirectionalLight, Light, LightColor, PointLight, SpotLight};
use crate::gfx::{
    camera::FpsCamera,
    shading::{lighting_program::POINT_LIGHT_COUNT, ShadingStage},
};

/// The flashlight hangs this far below the eye.
pub const FLASHLIGHT_DROP: f32 = 0.5;

/// Fixed set of lights for the scene.
///
/// Point light order matters: index `i` is written to `pointLights[i]` in the
/// shader. Only the spotlight changes at runtime; it follows the camera and
/// can be switched off.
#[derive(Debug, Clone)]
pub struct LightRig {
    pub sun: DirectionalLight,
    pub points: [PointLight; POINT_LIGHT_COUNT],
    pub spot: SpotLight,
}

impl LightRig {
    /// Moonlit forest: a dim sun, the campfire, the tower lantern, three house
    /// lamps and a flashlight.
    pub fn forest() -> Self {
        let house_lamp = |position: Point3<f32>| PointLight {
            position,
            color: LightColor::new(
                Vector3::new(0.9, 0.9, 0.9),
                Vector3::new(0.8, 0.5, 0.5),
                Vector3::new(0.2, 0.2, 0.2),
            ),
            attenuation: Attenuation::new(1.0, 0.001, 0.001),
        };

        Self {
            sun: DirectionalLight {
                direction: Vector3::new(0.0, -0.9, -0.17),
                color: LightColor::grey(0.2, 0.2, 0.1),
            },
            points: [
                // campfire
                PointLight {
                    position: Point3::new(0.0, 0.0, 0.0),
                    color: LightColor::new(
                        Vector3::new(0.2, 0.2, 0.2),
                        Vector3::new(1.0, 0.0, 0.0),
                        Vector3::new(1.0, 1.0, 1.0),
                    ),
                    attenuation: Attenuation::new(1.0, 0.05, 0.05),
                },
                // tower lantern
                PointLight {
                    position: Point3::new(-20.0, 25.0, 20.0),
                    color: LightColor::new(
                        Vector3::new(0.8, 0.8, 0.8),
                        Vector3::new(1.0, 0.1, 0.0),
                        Vector3::new(1.0, 1.0, 1.0),
                    ),
                    attenuation: Attenuation::new(1.0, 0.001, 0.002),
                },
                house_lamp(Point3::new(50.0, 5.0, 20.0)),
                house_lamp(Point3::new(50.0, 5.0, 15.0)),
                house_lamp(Point3::new(50.0, 5.0, 25.0)),
            ],
            spot: SpotLight {
                position: Point3::new(0.0, -FLASHLIGHT_DROP, 0.0),
                direction: Vector3::new(0.0, 0.0, -1.0),
                color: LightColor::grey(0.8, 0.8, 1.0),
                attenuation: Attenuation::new(1.0, 0.01, 0.001),
                cos_inner_cone: 1.0,
                cos_outer_cone: 1.0,
                on: true,
            }
            .with_cone(Deg(15.0), Deg(20.0)),
        }
    }

    /// Mounts the spotlight on the camera: just below the eye, aimed along the view.
    pub fn track_camera(&mut self, camera: &FpsCamera) {
        self.spot.position = camera.position() - Vector3::new(0.0, FLASHLIGHT_DROP, 0.0);
        self.spot.direction = camera.look().normalize();
    }

    /// Flips the flashlight and returns the new state.
    pub fn toggle_flashlight(&mut self) -> bool {
        self.spot.on = !self.spot.on;
        self.spot.on
    }

    pub fn flashlight_on(&self) -> bool {
        self.spot.on
    }

    /// Every light paired with the uniform prefix it is written under.
    pub fn lights(&self) -> impl Iterator<Item = (String, Light)> + '_ {
        std::iter::once(("sunLight".to_string(), Light::from(self.sun)))
            .chain(
                self.points
                    .iter()
                    .enumerate()
                    .map(|(i, light)| (format!("pointLights[{i}]"), Light::from(*light))),
            )
            .chain(std::iter::once(("spotLight".to_string(), Light::from(self.spot))))
    }

    pub fn push_uniforms(&self, stage: &mut impl ShadingStage) {
        for (prefix, light) in self.lights() {
            light.push_uniforms(stage, &prefix);
        }
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::forest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut rig = LightRig::forest();
        let initial = rig.flashlight_on();
        assert!(initial);

        assert_eq!(rig.toggle_flashlight(), !initial);
        assert_eq!(rig.toggle_flashlight(), initial);
        assert_eq!(rig.flashlight_on(), initial);
    }

    #[test]
    fn test_spotlight_tracks_camera() {
        let mut rig = LightRig::forest();
        let camera = FpsCamera::new(Point3::new(3.0, 10.0, -4.0), 90.0, 0.0);
        rig.track_camera(&camera);

        assert_eq!(rig.spot.position, Point3::new(3.0, 9.5, -4.0));
        assert!((rig.spot.direction - camera.look()).magnitude() < 1e-6);
    }

    #[test]
    fn test_light_prefixes_in_shader_order() {
        let rig = LightRig::forest();
        let prefixes: Vec<String> = rig.lights().map(|(prefix, _)| prefix).collect();
        assert_eq!(
            prefixes,
            vec![
                "sunLight",
                "pointLights[0]",
                "pointLights[1]",
                "pointLights[2]",
                "pointLights[3]",
                "pointLights[4]",
                "spotLight",
            ]
        );
    }

    #[test]
    fn test_point_lights_are_fixed() {
        let rig = LightRig::forest();
        assert_eq!(rig.points[0].position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(rig.points[1].attenuation, Attenuation::new(1.0, 0.001, 0.002));
        assert_eq!(rig.points[3].position, Point3::new(50.0, 5.0, 15.0));
        assert!((rig.spot.cos_inner_cone - 15f32.to_radians().cos()).abs() < 1e-6);
        assert!((rig.spot.cos_outer_cone - 20f32.to_radians().cos()).abs() < 1e-6);
    }
}
