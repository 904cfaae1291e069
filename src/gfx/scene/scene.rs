use cgmath::{Deg, Matrix, Matrix4, Point3, Quaternion, Rotation3, SquareMatrix, Vector3};

use crate::{
    error::ConfigError,
    gfx::resources::{
        asset_library::{ModelHandles, SceneAssets},
        material::Material,
    },
};

use super::{
    description::{Category, SceneDescription},
    layout::InstanceLayout,
};

/// World transform of an entity: translate, then scale, then rotate.
pub fn model_matrix(
    position: Point3<f32>,
    scale: Vector3<f32>,
    orientation: Quaternion<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(position.x, position.y, position.z))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
        * Matrix4::from(orientation)
}

/// Inverse-transpose of `model`, so normals stay perpendicular to surfaces
/// under non-uniform scale. A degenerate model falls back to the identity.
pub fn normal_matrix(model: Matrix4<f32>) -> Matrix4<f32> {
    model
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix4::identity)
}

/// Everything needed to issue one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub category: Category,
    pub model: Matrix4<f32>,
    pub material: Material,
    pub handles: ModelHandles,
}

/// Immutable scene content: the description, its generated instances and the
/// asset handles they draw with.
pub struct Scene {
    pub description: SceneDescription,
    pub layout: InstanceLayout,
    pub assets: SceneAssets,
}

impl Scene {
    /// Checks that every fixed model and every instance has resolved assets.
    pub fn new(
        description: SceneDescription,
        layout: InstanceLayout,
        assets: SceneAssets,
    ) -> Result<Self, ConfigError> {
        description.validate()?;

        if assets.fixed.len() != description.fixed.len() {
            return Err(ConfigError::UnresolvedModel {
                category: Category::Landmark,
                index: assets.fixed.len(),
            });
        }

        for (category, instances) in layout.iter() {
            for instance in instances {
                if assets.variant(category, instance.variant).is_none() {
                    return Err(ConfigError::UnresolvedModel {
                        category,
                        index: instance.variant,
                    });
                }
            }
        }

        Ok(Self {
            description,
            layout,
            assets,
        })
    }

    /// Fixed models (landmarks, then props), then every scattered category in
    /// declaration order, each in insertion order.
    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem> + '_ {
        let fixed = self
            .description
            .fixed
            .iter()
            .zip(&self.assets.fixed)
            .map(|(model, handles)| DrawItem {
                category: model.category,
                model: model_matrix(model.position, model.scale, model.orientation),
                material: model.material,
                handles: *handles,
            });

        let scattered = self.description.scattered.iter().flat_map(move |scatter| {
            self.layout
                .get(scatter.category)
                .iter()
                .filter_map(move |instance| {
                    let variant = scatter.variants.get(instance.variant)?;
                    let handles = self.assets.variant(scatter.category, instance.variant)?;
                    Some(DrawItem {
                        category: scatter.category,
                        model: model_matrix(
                            instance.position,
                            variant.scale,
                            Quaternion::from_angle_y(Deg(instance.rotation)),
                        ),
                        material: scatter.material,
                        handles,
                    })
                })
        });

        fixed.chain(scattered)
    }

    pub fn draw_count(&self) -> usize {
        self.description.fixed.len() + self.layout.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::asset_library::{MeshHandle, TextureHandle};
    use cgmath::{InnerSpace, SquareMatrix, Transform};
    use rand::{rngs::StdRng, SeedableRng};

    fn fake_assets(description: &SceneDescription) -> SceneAssets {
        let mut next = 0;
        SceneAssets::resolve(description, |_| {
            next += 1;
            Ok(ModelHandles {
                mesh: MeshHandle(next),
                texture: TextureHandle(next),
            })
        })
        .unwrap()
    }

    #[test]
    fn test_model_matrix_order() {
        let m = model_matrix(
            Point3::new(10.0, 0.0, 5.0),
            Vector3::new(2.0, 2.0, 2.0),
            Quaternion::from_angle_y(Deg(90.0)),
        );
        // rotate (1,0,0) to (0,0,-1), scale to (0,0,-2), then translate
        let p = m.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(10.0, 0.0, 3.0)).magnitude() < 1e-5);

        let identity = model_matrix(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        );
        assert_eq!(identity, Matrix4::identity());
    }

    #[test]
    fn test_normal_matrix_keeps_normals_perpendicular() {
        let model = model_matrix(
            Point3::new(3.0, 0.0, -2.0),
            Vector3::new(4.0, 1.0, 1.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        );
        // a 45 degree slope and its normal, before scaling
        let tangent = Vector3::new(1.0, 1.0, 0.0);
        let normal = Vector3::new(-1.0, 1.0, 0.0);

        let tangent = model.transform_vector(tangent);
        let skewed = model.transform_vector(normal);
        let corrected = normal_matrix(model).transform_vector(normal);

        assert!(skewed.dot(tangent).abs() > 1.0);
        assert!(corrected.dot(tangent).abs() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_of_degenerate_model_is_identity() {
        let flat = Matrix4::from_nonuniform_scale(1.0, 0.0, 1.0);
        assert_eq!(normal_matrix(flat), Matrix4::identity());
    }

    #[test]
    fn test_draw_items_cover_every_entity_in_order() {
        let description = SceneDescription::forest();
        let layout = InstanceLayout::generate(&description, &mut StdRng::seed_from_u64(5));
        let assets = fake_assets(&description);
        let scene = Scene::new(description, layout, assets).unwrap();

        let categories: Vec<Category> = scene.draw_items().map(|item| item.category).collect();
        assert_eq!(categories.len(), scene.draw_count());
        assert_eq!(categories.len(), 8 + 800 + 3000 + 600 + 6);

        // non-decreasing category order: landmarks, props, trees, grass, mushrooms, firewood
        assert!(categories.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(categories[0], Category::Landmark);
        assert_eq!(categories[5], Category::Prop);
        assert_eq!(categories[8], Category::Tree);
        assert_eq!(categories.last(), Some(&Category::Firewood));
    }

    #[test]
    fn test_log_uses_reduced_specular() {
        let description = SceneDescription::forest();
        let layout = InstanceLayout::default();
        let assets = fake_assets(&description);
        let scene = Scene::new(description, layout, assets).unwrap();

        let items: Vec<DrawItem> = scene.draw_items().collect();
        assert_eq!(items.len(), 8);
        assert_eq!(items[5].material.specular, Vector3::new(0.4, 0.4, 0.4));
        assert_eq!(items[6].material.specular, Vector3::new(0.8, 0.8, 0.8));
    }

    #[test]
    fn test_unresolved_variant_is_rejected() {
        let description = SceneDescription::forest();
        let mut assets = fake_assets(&description);
        assets.variants.insert(Category::Firewood, Vec::new());

        let layout = InstanceLayout::generate(&description, &mut StdRng::seed_from_u64(1));
        let err = Scene::new(description, layout, assets).err();
        assert_eq!(
            err,
            Some(ConfigError::UnresolvedModel {
                category: Category::Firewood,
                index: 0
            })
        );
    }

    #[test]
    fn test_repeated_category_never_reaches_draw_list() {
        let mut description = SceneDescription::forest();
        description.scattered.retain(|s| s.category == Category::Mushroom);
        let mut extra = description.scattered[0].clone();
        extra.count = 10;
        extra.variants.truncate(1);
        description.scattered.push(extra);

        let layout = InstanceLayout::generate(&description, &mut StdRng::seed_from_u64(3));
        let assets = fake_assets(&description);
        assert_eq!(
            Scene::new(description, layout, assets).err(),
            Some(ConfigError::DuplicateCategory(Category::Mushroom))
        );
    }
}
