//! WGPU-based rendering engine
//!
//! Owns the device, surface, depth buffer and the lighting pipelines, and
//! replays a recorded frame in a single render pass.

use std::sync::Arc;

use crate::{
    error::InitError,
    gfx::{
        resources::{
            asset_library::AssetLibrary,
            mesh::DrawMesh,
            texture_resource::TextureResource,
        },
        shading::{FrameRecorder, LightingProgram, LIGHTING_SHADER},
    },
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        DynamicUniformBuffer, UniformBuffer,
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager, LIT_PIPELINE, WIREFRAME_PIPELINE};

/// Object blocks reserved before the first frame; the buffer grows on demand.
const INITIAL_OBJECT_CAPACITY: usize = 4096;

/// What the render loop should do after failing to acquire a surface texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceErrorAction {
    /// Reconfigure the surface and skip this frame
    Reconfigure,
    /// Skip this frame
    Skip,
    /// Stop rendering
    Fatal,
}

impl SurfaceErrorAction {
    pub fn for_error(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigure,
            wgpu::SurfaceError::Timeout => Self::Skip,
            _ => Self::Fatal,
        }
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    wireframe_supported: bool,
    clear_color: wgpu::Color,

    scene_ubo: UniformBuffer,
    scene_bind_group: wgpu::BindGroup,

    object_layout: BindGroupLayoutWithDesc,
    object_block_size: wgpu::BufferSize,
    object_ubo: DynamicUniformBuffer,
    object_bind_group: wgpu::BindGroup,

    material_layout: BindGroupLayoutWithDesc,
}

impl RenderEngine {
    /// Creates the device and surface for `window` and builds the lighting
    /// pipelines. `width` and `height` are framebuffer pixels.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        clear_color: wgpu::Color,
    ) -> Result<RenderEngine, InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::info!("adapter has no line polygon mode, wireframe toggle disabled");
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // lighting output is written as-is, without sRGB encoding
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(InitError::NoSurfaceFormat)?;
        log::info!("surface format {format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let program = LightingProgram::new();

        // group 0: per-frame scene block
        let scene_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Scene Bind Group");
        let scene_ubo = UniformBuffer::new(&device, program.scene.size() as u64, "scene");
        let scene_bind_group = BindGroupBuilder::new(&scene_layout)
            .resource(scene_ubo.binding_resource())
            .create(&device, "Scene Bind Group");

        // group 1: per-draw object block, one window per draw
        let object_block_size = wgpu::BufferSize::new(program.object.size() as u64)
            .unwrap_or(wgpu::BufferSize::MIN);
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::dynamic_uniform(Some(object_block_size)))
            .create(&device, "Object Bind Group");
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = crate::wgpu_utils::align_to(object_block_size.get(), alignment as u64);
        let object_ubo = DynamicUniformBuffer::new(&device, stride, INITIAL_OBJECT_CAPACITY, "objects");
        let object_bind_group = BindGroupBuilder::new(&object_layout)
            .buffer_window(object_ubo.buffer(), object_block_size)
            .create(&device, "Object Bind Group");

        // group 2: material.diffuseMap
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Material Bind Group");

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("lighting", LIGHTING_SHADER);

        let lit = PipelineConfig::default_with_shader("lighting")
            .with_label(LIT_PIPELINE)
            .with_color_format(format)
            .with_bind_group_layouts(vec![
                scene_layout.layout.clone(),
                object_layout.layout.clone(),
                material_layout.layout.clone(),
            ]);
        if wireframe_supported {
            let wireframe = lit
                .clone()
                .with_label(WIREFRAME_PIPELINE)
                .with_polygon_mode(wgpu::PolygonMode::Line);
            pipeline_manager.register_pipeline(WIREFRAME_PIPELINE, wireframe);
        }
        pipeline_manager.register_pipeline(LIT_PIPELINE, lit);

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{error}");
            }
        }

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            wireframe_supported,
            clear_color,
            scene_ubo,
            scene_bind_group,
            object_layout,
            object_block_size,
            object_ubo,
            object_bind_group,
            material_layout,
        })
    }

    /// Uploads the recorded uniforms and replays every draw in one pass.
    pub fn render(
        &mut self,
        frame: &FrameRecorder,
        assets: &AssetLibrary,
        wireframe: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.scene_ubo.update_content(&self.queue, frame.scene_bytes());
        if self
            .object_ubo
            .update_content(&self.device, &self.queue, frame.object_bytes())
        {
            self.object_bind_group = BindGroupBuilder::new(&self.object_layout)
                .buffer_window(self.object_ubo.buffer(), self.object_block_size)
                .create(&self.device, "Object Bind Group");
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let pipeline_name = if wireframe && self.wireframe_supported {
                WIREFRAME_PIPELINE
            } else {
                LIT_PIPELINE
            };

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(pipeline_name) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

                for draw in frame.draws() {
                    let (Some(mesh), Some(texture)) =
                        (assets.mesh(draw.mesh), assets.texture(draw.texture))
                    else {
                        continue;
                    };
                    render_pass.set_bind_group(1, &self.object_bind_group, &[draw.object_offset]);
                    render_pass.set_bind_group(2, &texture.bind_group, &[]);
                    render_pass.draw_mesh(mesh);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and depth buffer for new framebuffer dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Re-applies the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Layout every texture bind group is created against
    pub fn material_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.material_layout
    }

    /// Alignment per-draw object blocks must be recorded at
    pub fn object_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_actions() {
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Lost),
            SurfaceErrorAction::Reconfigure
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Outdated),
            SurfaceErrorAction::Reconfigure
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::Timeout),
            SurfaceErrorAction::Skip
        );
        assert_eq!(
            SurfaceErrorAction::for_error(&wgpu::SurfaceError::OutOfMemory),
            SurfaceErrorAction::Fatal
        );
    }
}
