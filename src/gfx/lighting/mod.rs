//! Light types and the scene's light rig

pub mod light;
pub mod rig;

pub use light::{Attenuation, DirectionalLight, Light, LightColor, PointLight, SpotLight};
pub use rig::LightRig;
