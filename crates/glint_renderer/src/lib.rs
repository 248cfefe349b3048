//! Glint Renderer - CPU Path Tracing
//!
//! The light-transport core: surfaces and their intersection queries, the
//! differential geometry at hit points, a closed set of scattering
//! functions, and a path tracer with next-event estimation at every bounce.
//!
//! Scenes are built once and then only read while rendering, so buckets of
//! pixels are traced in parallel without locking.

mod alias_table;
mod bucket;
mod bvh;
mod camera;
mod differential_geometry;
mod image_buffer;
mod material;
mod mesh;
mod progress;
mod renderer;
mod scene;
mod sphere;
mod surface;

pub mod scattering;

pub use alias_table::{AliasSample, AliasTable};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::Bvh;
pub use camera::{look_at_matrix, Camera};
pub use differential_geometry::DifferentialGeometry;
pub use image_buffer::{color_to_rgba, linear_to_gamma, ImageBuffer};
pub use material::{Material, DEFAULT_GLASS_ETA, DEFAULT_MIRROR_ETA};
pub use mesh::{Mesh, MeshError, Normals, TriangleMesh};
pub use progress::RenderProgress;
pub use renderer::{render, Integrator, PathTracer, RenderConfig, RenderOutcome};
pub use scattering::{Color, ScatteringFunction, ScatteringSample};
pub use scene::{Scene, SceneIntersection, SurfacePrimitive};
pub use sphere::Sphere;
pub use surface::{Intersection, Surface};

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Interval, Mat4, Ray, Transform, Vec2, Vec3};
