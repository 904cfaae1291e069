//! Texture resource management for wgpu
//!
//! Decodes image files on the CPU (with an optional mip chain) and uploads
//! them as sampled GPU textures. Also provides the depth buffer.

use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::{
    error::AssetError,
    wgpu_utils::binding_builder::{BindGroupBuilder, BindGroupLayoutWithDesc},
};

/// Decoded RGBA8 image with its mip levels, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub levels: Vec<RgbaImage>,
}

impl TextureData {
    pub fn load(path: &Path, generate_mipmaps: bool) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|source| AssetError::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_image(image.to_rgba8(), generate_mipmaps))
    }

    pub fn from_image(base: RgbaImage, generate_mipmaps: bool) -> Self {
        let (width, height) = base.dimensions();
        let mut levels = vec![base];

        if generate_mipmaps {
            let (mut w, mut h) = (width, height);
            while w > 1 || h > 1 {
                w = (w / 2).max(1);
                h = (h / 2).max(1);
                let next = match levels.last() {
                    Some(prev) => image::imageops::resize(prev, w, h, FilterType::Triangle),
                    None => break,
                };
                levels.push(next);
            }
        }

        Self {
            width,
            height,
            levels,
        }
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Colour textures are sampled as linear values, like the framebuffer they end up in
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads every mip level of `data` and creates a repeating trilinear sampler.
    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: data.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, image) in data.levels.iter().enumerate() {
            let (width, height) = image.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mipmap_filter = if data.mip_level_count() > 1 {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Bind group exposing this texture as `material.diffuseMap`
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(wgpu::BindingResource::TextureView(&self.view))
            .resource(wgpu::BindingResource::Sampler(&self.sampler))
            .create(device, label)
    }
}
