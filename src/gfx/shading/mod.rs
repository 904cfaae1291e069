//! Named-uniform shading interface
//!
//! The frame renderer talks to the GPU only through [`ShadingStage`]: it sets
//! uniforms by name, binds textures to units and issues draws. The uniform
//! names and byte layout of the lighting shader live in [`lighting_program`].

pub mod frame;
pub mod lighting_program;
pub mod program;
pub mod uniform_block;

pub use frame::{DrawCall, FrameRecorder};
pub use lighting_program::{LightingProgram, DIFFUSE_MAP, LIGHTING_SHADER, POINT_LIGHT_COUNT};
pub use program::{ShadingStage, ShadingStageExt};
pub use uniform_block::{UniformBlock, UniformKind, UniformLayout, UniformValue};
