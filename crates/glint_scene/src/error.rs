//! Errors raised while building a scene.

use glint_renderer::MeshError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while authoring or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Material {0} is already defined")]
    DuplicateMaterial(String),

    #[error("Unknown material kind: {0}")]
    UnknownMaterialKind(String),

    #[error("Material kind {kind} requires property {property}")]
    MissingProperty { kind: String, property: String },

    #[error("Property {property} of material kind {kind} must be a {expected}")]
    PropertyType {
        kind: String,
        property: String,
        expected: &'static str,
    },

    #[error("Spheres only support uniform scale")]
    NonUniformScale,

    #[error("Sphere radius {0} must be finite and non-negative")]
    InvalidRadius(f32),

    #[error("Rotation axis {0:?} has no direction")]
    InvalidAxis([f32; 3]),

    #[error("Pop without matching push on the {0} stack")]
    StackUnderflow(&'static str),

    #[error("{what} buffer has {len} values, not a multiple of {multiple}")]
    BufferLength {
        what: &'static str,
        len: usize,
        multiple: usize,
    },

    #[error("Image size {width}x{height} is empty")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
