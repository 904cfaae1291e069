//! # Scene Content
//!
//! What the forest contains and where it goes. Nothing in this module touches
//! the GPU: asset loading hands back handles, and the frame renderer turns the
//! scene's [`DrawItem`]s into draw calls.
//!
//! ## Key Components
//!
//! - [`SceneDescription`] - fixed models and scattered categories with their materials
//! - [`InstanceLayout`] - randomly placed instances, generated once at startup
//! - [`Scene`] - description, layout and asset handles combined, in draw order
//! - [`Vertex3D`] - vertex format with position, normal and texture coordinates
//!
//! ```no_run
//! use woodland::gfx::scene::{InstanceLayout, SceneDescription};
//!
//! let description = SceneDescription::forest();
//! let layout = InstanceLayout::from_seed(&description, Some(7));
//! assert_eq!(layout.total(), 4406);
//! ```

pub mod description;
pub mod layout;
pub mod scene;
pub mod vertex;

pub use description::{Category, FixedModel, ModelSource, Placement, SceneDescription};
pub use layout::{Instance, InstanceLayout};
pub use scene::{model_matrix, normal_matrix, DrawItem, Scene};
pub use vertex::Vertex3D;
