//! Scene authoring for Glint.
//!
//! Everything here produces the immutable [`glint_renderer::Scene`] the path
//! tracer consumes: an explicit [`MaterialRegistry`] for building materials
//! by kind name, a [`SceneBuilder`] with transform and attribute stacks, JSON
//! scene files, and built-in presets.

mod builder;
mod error;
mod file;
pub mod presets;
mod registry;

pub use builder::{look_at, Orientation, SceneBuilder, DEFAULT_MATERIAL};
pub use error::{SceneError, SceneResult};
pub use file::{
    load_scene_file, parse_scene, CameraDesc, GeometryDesc, LoadedScene, MaterialDesc, SceneFile,
    ShapeDesc, TransformDesc,
};
pub use registry::{MaterialFactory, MaterialRegistry, Properties, PropertyReader, PropertyValue};
