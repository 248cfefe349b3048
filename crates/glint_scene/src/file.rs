//! JSON scene files.
//!
//! A scene file names its materials up front and then lists shapes, each
//! with its own transform chain:
//!
//! ```json
//! {
//!   "camera": { "eye": [0, 0, 3], "center": [0, 0, -1] },
//!   "width": 256, "height": 256,
//!   "materials": [
//!     { "name": "red", "kind": "matte", "properties": { "albedo": [0.8, 0.1, 0.1] } }
//!   ],
//!   "shapes": [
//!     {
//!       "material": "red",
//!       "transforms": [{ "scale": [2, 2, 2] }],
//!       "sphere": { "center": [0, 0, 0], "radius": 0.5 }
//!     }
//!   ],
//!   "render": { "paths_per_pixel": 64, "integrator": "path_tracing" }
//! }
//! ```

use crate::{MaterialRegistry, Orientation, Properties, SceneBuilder, SceneError, SceneResult};
use glint_math::Vec3;
use glint_renderer::{Camera, RenderConfig, Scene};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    60.0
}

fn default_size() -> u32 {
    512
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov_y_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformDesc {
    Translate([f32; 3]),
    Rotate { degrees: f32, axis: [f32; 3] },
    Scale([f32; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Mesh {
        vertices: Vec<f32>,
        #[serde(default)]
        parametrics: Option<Vec<f32>>,
        #[serde(default)]
        normals: Option<Vec<f32>>,
        triangles: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDesc {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub orientation: Orientation,
    /// Applied in order, so the last entry acts on the geometry first.
    #[serde(default)]
    pub transforms: Vec<TransformDesc>,
    #[serde(flatten)]
    pub geometry: GeometryDesc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub camera: CameraDesc,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default)]
    pub render: Option<RenderConfig>,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    #[serde(default)]
    pub shapes: Vec<ShapeDesc>,
}

/// A scene ready to render, with its camera and image size.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub render: Option<RenderConfig>,
}

impl LoadedScene {
    /// The file's render settings, or the defaults.
    pub fn render_config(&self) -> RenderConfig {
        self.render.clone().unwrap_or_default()
    }

    /// Change the output size, keeping the camera's aspect ratio in step.
    pub fn resize(&mut self, width: u32, height: u32) -> SceneResult<()> {
        if width == 0 || height == 0 {
            return Err(SceneError::EmptyImage { width, height });
        }
        self.width = width;
        self.height = height;
        self.camera = self.camera.with_aspect(width as f32 / height as f32);
        Ok(())
    }
}

impl SceneFile {
    /// Build the scene using materials from `registry`.
    pub fn instantiate(&self, registry: &MaterialRegistry) -> SceneResult<LoadedScene> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }

        let mut builder = SceneBuilder::new();
        for desc in &self.materials {
            let material = registry.make(&desc.kind, &desc.properties)?;
            builder.material(&desc.name, material)?;
            log::debug!("Material {} ({})", desc.name, desc.kind);
        }
        builder.set_material(crate::DEFAULT_MATERIAL)?;

        for shape in &self.shapes {
            add_shape(&mut builder, shape)?;
        }

        let camera = Camera::look_at(
            Vec3::from_array(self.camera.eye),
            Vec3::from_array(self.camera.center),
            Vec3::from_array(self.camera.up),
            self.camera.fov_y_degrees,
            self.width as f32 / self.height as f32,
        );

        Ok(LoadedScene {
            scene: builder.build(),
            camera,
            width: self.width,
            height: self.height,
            render: self.render.clone(),
        })
    }
}

fn add_shape(builder: &mut SceneBuilder, shape: &ShapeDesc) -> SceneResult<()> {
    builder.push_attributes();
    builder.push_matrix();

    if let Some(name) = &shape.material {
        builder.set_material(name)?;
    }
    builder.set_orientation(shape.orientation);

    for transform in &shape.transforms {
        match *transform {
            TransformDesc::Translate(offset) => builder.translate(Vec3::from_array(offset)),
            TransformDesc::Rotate { degrees, axis } => {
                builder.rotate(degrees, Vec3::from_array(axis))?
            }
            TransformDesc::Scale(factors) => builder.scale(Vec3::from_array(factors)),
        }
    }

    match &shape.geometry {
        GeometryDesc::Sphere { center, radius } => {
            builder.sphere(Vec3::from_array(*center), *radius)?
        }
        GeometryDesc::Mesh {
            vertices,
            parametrics,
            normals,
            triangles,
        } => builder.mesh_from_buffers(
            vertices,
            parametrics.as_deref(),
            normals.as_deref(),
            triangles,
        )?,
    }

    builder.pop_matrix()?;
    builder.pop_attributes()
}

/// Parse and build a scene with the built-in material kinds.
pub fn parse_scene(json: &str) -> SceneResult<LoadedScene> {
    let file: SceneFile = serde_json::from_str(json)?;
    file.instantiate(&MaterialRegistry::with_builtins())
}

/// Load a scene file from disk.
pub fn load_scene_file(path: impl AsRef<Path>) -> SceneResult<LoadedScene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loading scene {}", path.display());
    parse_scene(&json)
}
