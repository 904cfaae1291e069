//! Procedural placement of scattered scenery
//!
//! Runs once at startup. Each instance picks a model variant, a ground
//! position accepted by its category's [`Placement`] rule and a rotation
//! about the up axis. The result never changes afterwards.

use std::collections::BTreeMap;

use cgmath::Point3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::description::{Category, Placement, ScatterCategory, SceneDescription};

/// Rejection sampling gives up after this many candidates and keeps the last one.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 1000;

/// One placed copy of a category's model variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    /// Index into the category's variant list
    pub variant: usize,
    pub position: Point3<f32>,
    /// Degrees about the world up axis
    pub rotation: f32,
}

#[derive(Debug, Clone, Default)]
pub struct InstanceLayout {
    instances: BTreeMap<Category, Vec<Instance>>,
}

impl InstanceLayout {
    /// Seeded layouts are reproducible; without a seed the OS entropy source is used.
    pub fn from_seed(scene: &SceneDescription, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => {
                log::info!("generating layout with seed {seed}");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Self::generate(scene, &mut rng)
    }

    pub fn generate<R: Rng + ?Sized>(scene: &SceneDescription, rng: &mut R) -> Self {
        let half_extent = scene.ground_half_extent;
        let instances = scene
            .scattered
            .iter()
            .map(|scatter| {
                let placed = match scatter.placement {
                    Placement::PairedRing { radius, jitter } => {
                        scatter_pairs(scatter, radius, jitter, rng)
                    }
                    _ => scatter_singles(scatter, half_extent, rng),
                };
                log::info!("placed {} {} instances", placed.len(), scatter.category.name());
                (scatter.category, placed)
            })
            .collect();

        Self { instances }
    }

    pub fn get(&self, category: Category) -> &[Instance] {
        self.instances
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories in `Category` order with their instances. Draw order comes
    /// from the description, not from here.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Instance])> {
        self.instances
            .iter()
            .map(|(category, instances)| (*category, instances.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }
}

fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(0.0..360.0)
}

fn scatter_singles<R: Rng + ?Sized>(
    scatter: &ScatterCategory,
    half_extent: f32,
    rng: &mut R,
) -> Vec<Instance> {
    let mut fallbacks = 0;
    let instances = (0..scatter.count)
        .map(|_| {
            let variant = rng.random_range(0..scatter.variants.len());

            let mut candidate: (f32, f32) = (0.0, 0.0);
            let mut accepted = false;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                candidate = (
                    rng.random_range(-half_extent..half_extent),
                    rng.random_range(-half_extent..half_extent),
                );
                if scatter.placement.accepts(candidate.0, candidate.1) {
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                fallbacks += 1;
            }

            Instance {
                variant,
                position: Point3::new(candidate.0, 0.0, candidate.1),
                rotation: random_rotation(rng),
            }
        })
        .collect();

    if fallbacks > 0 {
        log::warn!(
            "{} {} instances kept a rejected position after {MAX_PLACEMENT_ATTEMPTS} attempts",
            fallbacks,
            scatter.category.name()
        );
    }
    instances
}

/// Consecutive instances (2i, 2i+1) share a ring position and face opposite ways.
fn scatter_pairs<R: Rng + ?Sized>(
    scatter: &ScatterCategory,
    radius: f32,
    jitter: f32,
    rng: &mut R,
) -> Vec<Instance> {
    let mut instances = Vec::with_capacity(scatter.count);

    for _ in 0..scatter.count / 2 {
        let variant = rng.random_range(0..scatter.variants.len());
        let r = if jitter > 0.0 {
            radius + rng.random_range(-jitter..jitter)
        } else {
            radius
        };
        let angle = rng.random_range(0.0f32..360.0).to_radians();
        let position = Point3::new(r * angle.cos(), 0.0, r * angle.sin());
        let rotation = random_rotation(rng);

        instances.push(Instance {
            variant,
            position,
            rotation,
        });
        instances.push(Instance {
            variant,
            position,
            rotation: rotation + 180.0,
        });
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::description::{ExclusionRect, ModelSource, ModelVariant};
    use crate::gfx::resources::material::Material;

    fn forest_layout(seed: u64) -> (SceneDescription, InstanceLayout) {
        let scene = SceneDescription::forest();
        let mut rng = StdRng::seed_from_u64(seed);
        let layout = InstanceLayout::generate(&scene, &mut rng);
        (scene, layout)
    }

    #[test]
    fn test_counts_match_description() {
        let (scene, layout) = forest_layout(7);
        for scatter in &scene.scattered {
            assert_eq!(layout.get(scatter.category).len(), scatter.count);
        }
        assert_eq!(layout.total(), 800 + 3000 + 600 + 6);
        assert!(layout.get(Category::Landmark).is_empty());
    }

    #[test]
    fn test_trees_respect_exclusion_radius() {
        for seed in 0..5 {
            let (_, layout) = forest_layout(seed);
            for tree in layout.get(Category::Tree) {
                let d = (tree.position.x.powi(2) + tree.position.z.powi(2)).sqrt();
                assert!(d >= 75.0, "tree at distance {d}");
            }
        }
    }

    #[test]
    fn test_grass_avoids_rectangle() {
        let (_, layout) = forest_layout(11);
        let rect = ExclusionRect {
            min_x: 30.0,
            max_x: 70.0,
            min_z: 5.0,
            max_z: 35.0,
        };
        for grass in layout.get(Category::Grass) {
            assert!(!rect.strictly_contains(grass.position.x, grass.position.z));
        }
    }

    #[test]
    fn test_firewood_pairs_share_position() {
        let (_, layout) = forest_layout(3);
        let wood = layout.get(Category::Firewood);
        assert_eq!(wood.len() % 2, 0);

        for pair in wood.chunks_exact(2) {
            assert_eq!(pair[0].position, pair[1].position);
            assert_eq!(pair[0].variant, pair[1].variant);
            assert!((pair[1].rotation - pair[0].rotation - 180.0).abs() < 1e-4);

            let r = (pair[0].position.x.powi(2) + pair[0].position.z.powi(2)).sqrt();
            assert!((40.0 - 1e-3..=50.0 + 1e-3).contains(&r));
        }
    }

    #[test]
    fn test_variants_and_bounds() {
        let (scene, layout) = forest_layout(19);
        let h = scene.ground_half_extent;
        for (category, instances) in layout.iter() {
            let variants = scene.scatter(category).unwrap().variants.len();
            for instance in instances {
                assert!(instance.variant < variants);
                assert!(instance.position.x >= -h && instance.position.x < h);
                assert!(instance.position.z >= -h && instance.position.z < h);
                assert_eq!(instance.position.y, 0.0);
            }
        }
    }

    #[test]
    fn test_iter_follows_category_order_not_description_order() {
        let (mut scene, _) = forest_layout(7);
        scene.scattered.reverse();
        let layout = InstanceLayout::generate(&scene, &mut StdRng::seed_from_u64(7));

        let categories: Vec<Category> = layout.iter().map(|(category, _)| category).collect();
        assert_eq!(
            categories,
            [Category::Tree, Category::Grass, Category::Mushroom, Category::Firewood]
        );
        assert_eq!(scene.scattered[0].category, Category::Firewood);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let (_, a) = forest_layout(42);
        let (_, b) = forest_layout(42);
        assert_eq!(a.get(Category::Tree), b.get(Category::Tree));
        assert_eq!(a.get(Category::Firewood), b.get(Category::Firewood));
    }

    #[test]
    fn test_impossible_predicate_still_terminates() {
        let scene = SceneDescription {
            ground_half_extent: 10.0,
            fixed: Vec::new(),
            scattered: vec![ScatterCategory {
                category: Category::Tree,
                count: 3,
                variants: vec![ModelVariant::uniform(ModelSource::new("t.obj", "t.png"), 1.0)],
                placement: Placement::ExcludeRadius(1000.0),
                material: Material::default(),
            }],
        };
        let mut rng = StdRng::seed_from_u64(1);
        let layout = InstanceLayout::generate(&scene, &mut rng);
        assert_eq!(layout.get(Category::Tree).len(), 3);
    }
}
