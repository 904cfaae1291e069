//! Loaded meshes and textures, addressed by small copyable handles
//!
//! Each file is loaded once: meshes are keyed by path, textures by path and
//! mipmap flag. The scene refers to assets only through [`MeshHandle`] and
//! [`TextureHandle`], so the frame renderer never touches file paths or GPU
//! objects directly.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
    path::{Path, PathBuf},
};

use crate::{
    error::AssetError,
    gfx::scene::description::{Category, ModelSource, SceneDescription},
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::{
    mesh::{Mesh, MeshData},
    texture_resource::{TextureData, TextureResource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub usize);

/// Mesh and texture of one drawable model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelHandles {
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
}

/// Append-only store that loads each key at most once.
#[derive(Debug)]
pub struct AssetStore<K, T> {
    items: Vec<T>,
    index: HashMap<K, usize>,
}

impl<K, T> Default for AssetStore<K, T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> AssetStore<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `key`, running `load` only the first time the key is seen.
    pub fn get_or_load<E>(
        &mut self,
        key: K,
        load: impl FnOnce(&K) -> Result<T, E>,
    ) -> Result<usize, E> {
        if let Some(&i) = self.index.get(&key) {
            return Ok(i);
        }
        let item = load(&key)?;
        self.items.push(item);
        let i = self.items.len() - 1;
        self.index.insert(key, i);
        Ok(i)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A sampled texture together with its material bind group.
pub struct GpuTexture {
    pub resource: TextureResource,
    pub bind_group: wgpu::BindGroup,
}

/// Owner of every GPU mesh and texture in the scene.
pub struct AssetLibrary {
    root: PathBuf,
    meshes: AssetStore<PathBuf, Mesh>,
    textures: AssetStore<(PathBuf, bool), GpuTexture>,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            meshes: AssetStore::new(),
            textures: AssetStore::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_mesh(
        &mut self,
        device: &wgpu::Device,
        relative: &Path,
    ) -> Result<MeshHandle, AssetError> {
        let path = self.root.join(relative);
        self.meshes
            .get_or_load(path, |path| {
                log::debug!("loading mesh {}", path.display());
                let data = MeshData::from_obj(path)?;
                Ok(Mesh::upload(device, &data, &relative.display().to_string()))
            })
            .map(MeshHandle)
    }

    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        relative: &Path,
        generate_mipmaps: bool,
    ) -> Result<TextureHandle, AssetError> {
        let path = self.root.join(relative);
        self.textures
            .get_or_load((path, generate_mipmaps), |(path, mipmaps)| {
                log::debug!("loading texture {} (mipmaps: {mipmaps})", path.display());
                let data = TextureData::load(path, *mipmaps)?;
                let label = relative.display().to_string();
                let resource = TextureResource::from_data(device, queue, &data, &label);
                let bind_group = resource.create_bind_group(device, layout, &label);
                Ok(GpuTexture {
                    resource,
                    bind_group,
                })
            })
            .map(TextureHandle)
    }

    pub fn load_model(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        source: &ModelSource,
    ) -> Result<ModelHandles, AssetError> {
        Ok(ModelHandles {
            mesh: self.load_mesh(device, &source.mesh)?,
            texture: self.load_texture(device, queue, layout, &source.texture, source.mipmaps)?,
        })
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle.0)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

/// Handles for every model a scene description refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAssets {
    /// Parallel to `SceneDescription::fixed`
    pub fixed: Vec<ModelHandles>,
    /// Parallel to each category's variant list
    pub variants: BTreeMap<Category, Vec<ModelHandles>>,
}

impl SceneAssets {
    /// Resolves every model source through `load`, stopping at the first failure.
    pub fn resolve(
        scene: &SceneDescription,
        mut load: impl FnMut(&ModelSource) -> Result<ModelHandles, AssetError>,
    ) -> Result<Self, AssetError> {
        let fixed = scene
            .fixed
            .iter()
            .map(|model| load(&model.source))
            .collect::<Result<Vec<_>, _>>()?;

        let mut variants = BTreeMap::new();
        for scatter in &scene.scattered {
            let handles = scatter
                .variants
                .iter()
                .map(|variant| load(&variant.source))
                .collect::<Result<Vec<_>, _>>()?;
            variants.insert(scatter.category, handles);
        }

        Ok(Self { fixed, variants })
    }

    pub fn variant(&self, category: Category, index: usize) -> Option<ModelHandles> {
        self.variants.get(&category)?.get(index).copied()
    }
}
