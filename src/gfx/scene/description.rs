//! Declarative scene content
//!
//! A [`SceneDescription`] lists what goes into the world: fixed single
//! placements (landmarks and props) and scattered categories with their model
//! variants, counts and placement rules. It holds no GPU state and no random
//! numbers; [`InstanceLayout`](super::layout::InstanceLayout) turns the scatter
//! rules into concrete instances once at startup.

use std::path::PathBuf;

use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};

use crate::{error::ConfigError, gfx::resources::material::Material};

/// Identity of a group of scene entities. The declaration order is the draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Landmark,
    Prop,
    Tree,
    Grass,
    Mushroom,
    Firewood,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Landmark => "landmark",
            Category::Prop => "prop",
            Category::Tree => "tree",
            Category::Grass => "grass",
            Category::Mushroom => "mushroom",
            Category::Firewood => "firewood",
        }
    }
}

/// Mesh and texture files of one model, relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelSource {
    pub mesh: PathBuf,
    pub texture: PathBuf,
    pub mipmaps: bool,
}

impl ModelSource {
    pub fn new(mesh: &str, texture: &str) -> Self {
        Self {
            mesh: PathBuf::from("models").join(mesh),
            texture: PathBuf::from("textures").join(texture),
            mipmaps: true,
        }
    }

    pub fn without_mipmaps(mut self) -> Self {
        self.mipmaps = false;
        self
    }
}

/// One selectable model of a scattered category and the scale it is drawn at.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVariant {
    pub source: ModelSource,
    pub scale: Vector3<f32>,
}

impl ModelVariant {
    pub fn uniform(source: ModelSource, scale: f32) -> Self {
        Self {
            source,
            scale: Vector3::new(scale, scale, scale),
        }
    }
}

/// A model placed exactly once at a hand-picked transform.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedModel {
    pub name: String,
    pub category: Category,
    pub source: ModelSource,
    pub position: Point3<f32>,
    pub scale: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    pub material: Material,
}

impl FixedModel {
    pub fn new(name: &str, category: Category, source: ModelSource) -> Self {
        Self {
            name: name.to_string(),
            category,
            source,
            position: Point3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            material: Material::default(),
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Point3::new(x, y, z);
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn scaled_by(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation about the world up axis, in degrees
    pub fn turned(mut self, degrees: f32) -> Self {
        self.orientation = Quaternion::from_angle_y(Deg(degrees));
        self
    }

    pub fn oriented(mut self, orientation: Quaternion<f32>) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    fn is_finite(&self) -> bool {
        let p = self.position;
        let s = self.scale;
        let q = self.orientation;
        [p.x, p.y, p.z, s.x, s.y, s.z, q.s, q.v.x, q.v.y, q.v.z]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Axis-aligned keep-out rectangle on the ground plane. The boundary itself is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl ExclusionRect {
    pub fn strictly_contains(&self, x: f32, z: f32) -> bool {
        x > self.min_x && x < self.max_x && z > self.min_z && z < self.max_z
    }
}

/// Where the instances of a scattered category may go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Anywhere on the ground square
    Uniform,
    /// Anywhere at least this far from the origin
    ExcludeRadius(f32),
    /// Anywhere outside the rectangle
    ExcludeRect(ExclusionRect),
    /// Pairs on a ring around the origin. Both halves of a pair share a
    /// position and their rotations differ by 180 degrees.
    PairedRing { radius: f32, jitter: f32 },
}

impl Placement {
    pub fn is_paired(&self) -> bool {
        matches!(self, Placement::PairedRing { .. })
    }

    /// Whether a ground position satisfies the rule. Ring placement computes
    /// its positions directly and accepts everything here.
    pub fn accepts(&self, x: f32, z: f32) -> bool {
        match self {
            Placement::Uniform | Placement::PairedRing { .. } => true,
            Placement::ExcludeRadius(radius) => (x * x + z * z).sqrt() >= *radius,
            Placement::ExcludeRect(rect) => !rect.strictly_contains(x, z),
        }
    }
}

/// A procedurally scattered category.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterCategory {
    pub category: Category,
    pub count: usize,
    pub variants: Vec<ModelVariant>,
    pub placement: Placement,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    /// Scattered positions are drawn from [-half_extent, half_extent) on x and z
    pub ground_half_extent: f32,
    /// Landmarks first, then props
    pub fixed: Vec<FixedModel>,
    pub scattered: Vec<ScatterCategory>,
}

impl SceneDescription {
    /// The forest clearing: tower, campfire, cart and house surrounded by
    /// scattered trees, grass, mushrooms and firewood.
    pub fn forest() -> Self {
        let landmarks = [
            FixedModel::new(
                "floor",
                Category::Landmark,
                ModelSource::new("floor.obj", "Green1.jpg"),
            )
            .scaled_by(Vector3::new(200.0, 1.0, 200.0)),
            FixedModel::new(
                "wooden_tower",
                Category::Landmark,
                ModelSource::new("wooden_tower.obj", "wooden_tower.jpg"),
            )
            .at(-20.0, 0.0, 20.0)
            .scaled(3.8),
            FixedModel::new("fox", Category::Landmark, ModelSource::new("fox.obj", "fox.png"))
                .at(10.0, 0.0, 35.0)
                .scaled(0.05)
                .turned(160.0),
            FixedModel::new(
                "campfire",
                Category::Landmark,
                ModelSource::new("campfire.obj", "campfire.png"),
            )
            .scaled(3.0),
            FixedModel::new("cart", Category::Landmark, ModelSource::new("cart.obj", "cart_wood.png"))
                .at(-10.0, 0.0, -20.0)
                .scaled(2.0),
        ];

        let axe_orientation = Quaternion::from_axis_angle(Vector3::new(0.0, 0.0, -1.0), Deg(100.0))
            * Quaternion::from_axis_angle(Vector3::new(1.0, 0.0, 0.0), Deg(90.0));

        let props = [
            // a felled tree next to the campfire, reusing the last tree model
            FixedModel::new("log", Category::Prop, ModelSource::new("tree12.obj", "tree12.png"))
                .at(20.0, 0.0, 10.0)
                .scaled(10.0)
                .with_material(Material::default().with_specular(0.4)),
            FixedModel::new("axe", Category::Prop, ModelSource::new("axe.obj", "axe.png"))
                .at(18.0, 4.1, 10.0)
                .scaled(6.0)
                .oriented(axe_orientation),
            FixedModel::new("house", Category::Prop, ModelSource::new("house.obj", "cart_wood.png"))
                .at(50.0, 0.0, 20.0)
                .turned(180.0),
        ];

        let trees = (1..=12)
            .map(|i| {
                let scale = if i == 9 { 30.0 } else { 15.0 };
                ModelVariant::uniform(
                    ModelSource::new(&format!("tree{i}.obj"), &format!("tree{i}.png")),
                    scale,
                )
            })
            .collect();

        let grass = (1..=7)
            .map(|i| {
                ModelVariant::uniform(
                    ModelSource::new(&format!("grass_b{i}.obj"), "Green1.jpg").without_mipmaps(),
                    4.0,
                )
            })
            .collect();

        let mushrooms = [(1, 1.0), (2, 1.0), (3, 10.0), (5, 10.0), (5, 10.0), (8, 10.0)]
            .into_iter()
            .map(|(i, scale)| {
                ModelVariant::uniform(
                    ModelSource::new(&format!("mushroom{i}.obj"), &format!("mushroom{i}.jpg")),
                    scale,
                )
            })
            .collect();

        Self {
            ground_half_extent: 400.0,
            fixed: landmarks.into_iter().chain(props).collect(),
            scattered: vec![
                ScatterCategory {
                    category: Category::Tree,
                    count: 800,
                    variants: trees,
                    placement: Placement::ExcludeRadius(75.0),
                    material: Material::default(),
                },
                ScatterCategory {
                    category: Category::Grass,
                    count: 3000,
                    variants: grass,
                    placement: Placement::ExcludeRect(ExclusionRect {
                        min_x: 30.0,
                        max_x: 70.0,
                        min_z: 5.0,
                        max_z: 35.0,
                    }),
                    material: Material::default(),
                },
                ScatterCategory {
                    category: Category::Mushroom,
                    count: 600,
                    variants: mushrooms,
                    placement: Placement::Uniform,
                    material: Material::default(),
                },
                ScatterCategory {
                    category: Category::Firewood,
                    count: 6,
                    variants: vec![ModelVariant::uniform(
                        ModelSource::new("wood.obj", "wood.png"),
                        3.0,
                    )],
                    placement: Placement::PairedRing {
                        radius: 45.0,
                        jitter: 5.0,
                    },
                    material: Material::default(),
                },
            ],
        }
    }

    pub fn scatter(&self, category: Category) -> Option<&ScatterCategory> {
        self.scattered.iter().find(|s| s.category == category)
    }

    /// Checks the invariants the layout generator and renderer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ground_half_extent.is_finite() && self.ground_half_extent > 0.0) {
            return Err(ConfigError::EmptyGround(self.ground_half_extent));
        }

        for fixed in &self.fixed {
            if !fixed.is_finite() {
                return Err(ConfigError::NonFiniteTransform(fixed.name.clone()));
            }
        }

        for (i, scatter) in self.scattered.iter().enumerate() {
            if matches!(scatter.category, Category::Landmark | Category::Prop) {
                return Err(ConfigError::NotScatterable(scatter.category));
            }
            if self.scattered[..i]
                .iter()
                .any(|earlier| earlier.category == scatter.category)
            {
                return Err(ConfigError::DuplicateCategory(scatter.category));
            }
            if scatter.variants.is_empty() {
                return Err(ConfigError::NoVariants(scatter.category));
            }
            if scatter.placement.is_paired() && scatter.count % 2 != 0 {
                return Err(ConfigError::OddPairCount {
                    category: scatter.category,
                    count: scatter.count,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_is_valid() {
        let scene = SceneDescription::forest();
        assert_eq!(scene.validate(), Ok(()));
        assert_eq!(scene.fixed.len(), 8);
        assert_eq!(scene.scatter(Category::Tree).map(|s| s.count), Some(800));
        assert_eq!(scene.scatter(Category::Grass).map(|s| s.variants.len()), Some(7));
        assert_eq!(scene.scatter(Category::Mushroom).map(|s| s.variants.len()), Some(6));
    }

    #[test]
    fn test_fixed_models_are_landmarks_then_props() {
        let scene = SceneDescription::forest();
        let names: Vec<&str> = scene.fixed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["floor", "wooden_tower", "fox", "campfire", "cart", "log", "axe", "house"]
        );
        assert!(scene.fixed[..5].iter().all(|f| f.category == Category::Landmark));
        assert!(scene.fixed[5..].iter().all(|f| f.category == Category::Prop));
    }

    #[test]
    fn test_ninth_tree_is_double_size() {
        let scene = SceneDescription::forest();
        let trees = scene.scatter(Category::Tree).unwrap();
        assert_eq!(trees.variants[8].scale, Vector3::new(30.0, 30.0, 30.0));
        assert_eq!(trees.variants[0].scale, Vector3::new(15.0, 15.0, 15.0));
    }

    #[test]
    fn test_odd_pair_count_is_rejected() {
        let mut scene = SceneDescription::forest();
        for scatter in &mut scene.scattered {
            if scatter.category == Category::Firewood {
                scatter.count = 5;
            }
        }
        assert_eq!(
            scene.validate(),
            Err(ConfigError::OddPairCount {
                category: Category::Firewood,
                count: 5
            })
        );
    }

    #[test]
    fn test_empty_variants_and_bad_transform_are_rejected() {
        let mut scene = SceneDescription::forest();
        scene.scattered[2].variants.clear();
        assert_eq!(scene.validate(), Err(ConfigError::NoVariants(Category::Mushroom)));

        let mut scene = SceneDescription::forest();
        scene.fixed[1].position.x = f32::NAN;
        assert_eq!(
            scene.validate(),
            Err(ConfigError::NonFiniteTransform("wooden_tower".to_string()))
        );

        let mut scene = SceneDescription::forest();
        scene.ground_half_extent = 0.0;
        assert_eq!(scene.validate(), Err(ConfigError::EmptyGround(0.0)));
    }

    #[test]
    fn test_repeated_category_is_rejected() {
        let mut scene = SceneDescription::forest();
        let mut extra = scene.scattered[2].clone();
        extra.count = 10;
        extra.variants.truncate(1);
        scene.scattered.push(extra);
        assert_eq!(
            scene.validate(),
            Err(ConfigError::DuplicateCategory(Category::Mushroom))
        );
    }

    #[test]
    fn test_fixed_categories_cannot_be_scattered() {
        for category in [Category::Landmark, Category::Prop] {
            let mut scene = SceneDescription::forest();
            scene.scattered[0].category = category;
            assert_eq!(scene.validate(), Err(ConfigError::NotScatterable(category)));
        }
    }

    #[test]
    fn test_exclusion_rect_is_open() {
        let rect = ExclusionRect {
            min_x: 30.0,
            max_x: 70.0,
            min_z: 5.0,
            max_z: 35.0,
        };
        assert!(rect.strictly_contains(50.0, 20.0));
        assert!(!rect.strictly_contains(30.0, 20.0));
        assert!(!rect.strictly_contains(50.0, 35.0));
        assert!(Placement::ExcludeRect(rect).accepts(70.0, 5.0));
    }

    #[test]
    fn test_grass_texture_skips_mipmaps() {
        let scene = SceneDescription::forest();
        let grass = scene.scatter(Category::Grass).unwrap();
        assert!(grass.variants.iter().all(|v| !v.source.mipmaps));
        assert!(scene.fixed[0].source.mipmaps);
    }
}
