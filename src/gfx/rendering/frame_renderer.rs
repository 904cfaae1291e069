//! Per-frame draw sequence
//!
//! Pushes the camera and light rig once, then every entity of the scene with
//! its own model matrix and material. Everything goes through a
//! [`ShadingStage`], so the whole sequence can be recorded and checked
//! without a GPU.

use cgmath::Matrix4;

use crate::gfx::{
    camera::CameraManager,
    lighting::LightRig,
    resources::{asset_library::ModelHandles, material::Material},
    scene::{normal_matrix, Scene},
    shading::{ShadingStage, ShadingStageExt},
};

/// Texture unit the diffuse map is bound to.
pub const DIFFUSE_UNIT: u32 = 0;

/// View, projection and eye position.
pub fn push_camera(stage: &mut impl ShadingStage, camera: &CameraManager, width: u32, height: u32) {
    stage.uniform("view", camera.view_matrix());
    stage.uniform("projection", camera.projection_matrix(width, height));
    stage.uniform("viewPos", camera.camera.position());
}

/// Model and normal matrices, material, texture, draw.
pub fn draw_instance(
    stage: &mut impl ShadingStage,
    model: Matrix4<f32>,
    material: &Material,
    handles: ModelHandles,
) {
    stage.uniform("model", model);
    stage.uniform("normalMatrix", normal_matrix(model));
    material.push_uniforms(stage, DIFFUSE_UNIT);
    stage.bind_texture(DIFFUSE_UNIT, handles.texture);
    stage.draw(handles.mesh);
    stage.unbind_texture(DIFFUSE_UNIT);
}

/// Issues the full draw sequence for one frame. The flashlight is moved to
/// the camera first so it lights the frame being drawn.
pub fn render_frame(
    stage: &mut impl ShadingStage,
    camera: &CameraManager,
    rig: &mut LightRig,
    scene: &Scene,
    width: u32,
    height: u32,
) {
    push_camera(stage, camera, width, height);

    rig.track_camera(&camera.camera);
    rig.push_uniforms(stage);

    for item in scene.draw_items() {
        draw_instance(stage, item.model, &item.material, item.handles);
    }
}
