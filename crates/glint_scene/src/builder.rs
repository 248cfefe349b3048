//! Immediate-mode scene authoring.
//!
//! `SceneBuilder` keeps a transform stack and an attribute stack. Geometry
//! calls capture the current transform, material and orientation; nothing
//! about the finished [`Scene`] can change afterwards.

use crate::{SceneError, SceneResult};
use glint_math::{Mat4, Transform, Vec2, Vec3};
use glint_renderer::{look_at_matrix, Material, Mesh, Scene, Sphere, SurfacePrimitive, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name of the material that is current on a fresh builder.
pub const DEFAULT_MATERIAL: &str = "default";

/// Which side of a surface faces outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Outside,
    /// Reverse triangle winding and flip supplied normals.
    Inside,
}

#[derive(Debug, Clone)]
struct Attributes {
    material: Arc<Material>,
    orientation: Orientation,
}

/// Camera-to-world matrix for a camera at `eye` looking at `center`.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    look_at_matrix(eye, center, up)
}

pub struct SceneBuilder {
    transform: Transform,
    transform_stack: Vec<Transform>,
    attributes: Attributes,
    attribute_stack: Vec<Attributes>,
    materials: BTreeMap<String, Arc<Material>>,
    primitives: Vec<SurfacePrimitive>,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        let default = Arc::new(Material::Default);
        let mut materials = BTreeMap::new();
        materials.insert(DEFAULT_MATERIAL.to_string(), default.clone());

        Self {
            transform: Transform::IDENTITY,
            transform_stack: Vec::new(),
            attributes: Attributes {
                material: default,
                orientation: Orientation::Outside,
            },
            attribute_stack: Vec::new(),
            materials,
            primitives: Vec::new(),
        }
    }

    // ---- transform stack ----

    pub fn push_matrix(&mut self) {
        self.transform_stack.push(self.transform);
    }

    pub fn pop_matrix(&mut self) -> SceneResult<()> {
        self.transform = self
            .transform_stack
            .pop()
            .ok_or(SceneError::StackUnderflow("transform"))?;
        Ok(())
    }

    /// The transform applied to geometry added now.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Post-multiply the current transform, so the most recent call acts on
    /// the geometry first.
    pub fn mult_matrix(&mut self, transform: Transform) {
        self.transform = self.transform * transform;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.mult_matrix(Transform::translate(offset));
    }

    /// Rotate by `degrees` about `axis`, which must have a finite, non-zero
    /// length.
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) -> SceneResult<()> {
        if !axis.is_finite() || axis.length_squared() <= 0.0 {
            return Err(SceneError::InvalidAxis(axis.to_array()));
        }
        self.mult_matrix(Transform::rotate(degrees, axis));
        Ok(())
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.mult_matrix(Transform::scale(factors));
    }

    // ---- attribute stack ----

    pub fn push_attributes(&mut self) {
        self.attribute_stack.push(self.attributes.clone());
    }

    pub fn pop_attributes(&mut self) -> SceneResult<()> {
        self.attributes = self
            .attribute_stack
            .pop()
            .ok_or(SceneError::StackUnderflow("attribute"))?;
        Ok(())
    }

    /// Make a previously defined material current.
    pub fn set_material(&mut self, name: &str) -> SceneResult<()> {
        let material = self
            .materials
            .get(name)
            .ok_or_else(|| SceneError::UnknownMaterial(name.to_string()))?;
        self.attributes.material = material.clone();
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.attributes.orientation = orientation;
    }

    pub fn orientation(&self) -> Orientation {
        self.attributes.orientation
    }

    pub fn current_material(&self) -> &Material {
        &self.attributes.material
    }

    /// Define a named material and make it current.
    pub fn material(&mut self, name: &str, material: Material) -> SceneResult<()> {
        if self.materials.contains_key(name) {
            return Err(SceneError::DuplicateMaterial(name.to_string()));
        }
        let material = Arc::new(material);
        self.materials.insert(name.to_string(), material.clone());
        self.attributes.material = material;
        Ok(())
    }

    pub fn has_material(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    // ---- geometry ----

    /// Add a sphere. The current transform may rotate and uniformly scale it.
    pub fn sphere(&mut self, center: Vec3, radius: f32) -> SceneResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SceneError::InvalidRadius(radius));
        }
        let scale = self
            .transform
            .uniform_scale()
            .ok_or(SceneError::NonUniformScale)?;
        let sphere = Sphere::new(self.transform.point(center), radius * scale);
        self.add(sphere);
        Ok(())
    }

    pub fn mesh(&mut self, vertices: &[Vec3], triangles: &[[u32; 3]]) -> SceneResult<()> {
        let geometry = TriangleMesh::new(self.points(vertices), self.winding(triangles))?;
        self.add(Mesh::new(geometry));
        Ok(())
    }

    pub fn mesh_with_parametrics(
        &mut self,
        vertices: &[Vec3],
        parametrics: &[Vec2],
        triangles: &[[u32; 3]],
    ) -> SceneResult<()> {
        let geometry = TriangleMesh::with_parametrics(
            self.points(vertices),
            parametrics.to_vec(),
            self.winding(triangles),
        )?;
        self.add(Mesh::new(geometry));
        Ok(())
    }

    /// Add a mesh with per-vertex or per-face normals.
    pub fn mesh_with_normals(
        &mut self,
        vertices: &[Vec3],
        parametrics: Option<&[Vec2]>,
        normals: &[Vec3],
        triangles: &[[u32; 3]],
    ) -> SceneResult<()> {
        let flip = match self.attributes.orientation {
            Orientation::Outside => 1.0,
            Orientation::Inside => -1.0,
        };
        let normals = normals
            .iter()
            .map(|&n| flip * self.transform.normal(n))
            .collect();

        let geometry = TriangleMesh::with_normals(
            self.points(vertices),
            parametrics.map(<[Vec2]>::to_vec),
            normals,
            self.winding(triangles),
        )?;
        self.add(Mesh::new(geometry));
        Ok(())
    }

    /// Add a mesh from flat float/index buffers, as found in scene files.
    pub fn mesh_from_buffers(
        &mut self,
        vertices: &[f32],
        parametrics: Option<&[f32]>,
        normals: Option<&[f32]>,
        triangles: &[u32],
    ) -> SceneResult<()> {
        let vertices = vec3s("vertex", vertices)?;
        let triangles = chunked::<u32, 3>("index", triangles)?;
        let parametrics = parametrics
            .map(|p| chunked::<f32, 2>("parametric", p))
            .transpose()?
            .map(|p| p.into_iter().map(Vec2::from_array).collect::<Vec<_>>());

        match normals {
            Some(normals) => {
                let normals = vec3s("normal", normals)?;
                self.mesh_with_normals(&vertices, parametrics.as_deref(), &normals, &triangles)
            }
            None => match parametrics {
                Some(parametrics) => {
                    self.mesh_with_parametrics(&vertices, &parametrics, &triangles)
                }
                None => self.mesh(&vertices, &triangles),
            },
        }
    }

    /// Finish authoring.
    pub fn build(self) -> Scene {
        if !self.transform_stack.is_empty() || !self.attribute_stack.is_empty() {
            log::debug!(
                "Scene built with {} transform and {} attribute pushes outstanding",
                self.transform_stack.len(),
                self.attribute_stack.len()
            );
        }

        let scene = Scene::new(self.primitives);
        log::info!(
            "Built scene: {} primitives, {} emitters, {} materials",
            scene.len(),
            scene.emitters().count(),
            self.materials.len()
        );
        scene
    }

    fn points(&self, vertices: &[Vec3]) -> Vec<Vec3> {
        vertices.iter().map(|&p| self.transform.point(p)).collect()
    }

    fn winding(&self, triangles: &[[u32; 3]]) -> Vec<[u32; 3]> {
        match self.attributes.orientation {
            Orientation::Outside => triangles.to_vec(),
            Orientation::Inside => triangles.iter().map(|&[a, b, c]| [a, c, b]).collect(),
        }
    }

    fn add(&mut self, surface: impl Into<glint_renderer::Surface>) {
        self.primitives
            .push(SurfacePrimitive::new(surface, self.attributes.material.clone()));
    }
}

fn chunked<T: Copy + Default, const N: usize>(
    what: &'static str,
    values: &[T],
) -> SceneResult<Vec<[T; N]>> {
    if values.len() % N != 0 {
        return Err(SceneError::BufferLength {
            what,
            len: values.len(),
            multiple: N,
        });
    }
    Ok(values
        .chunks_exact(N)
        .map(|chunk| {
            let mut out = [T::default(); N];
            out.copy_from_slice(chunk);
            out
        })
        .collect())
}

fn vec3s(what: &'static str, values: &[f32]) -> SceneResult<Vec<Vec3>> {
    Ok(chunked::<f32, 3>(what, values)?
        .into_iter()
        .map(Vec3::from_array)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::Ray;
    use glint_renderer::{Color, Surface};

    const QUAD: [Vec3; 4] = [
        Vec3::new(-0.5, 0.0, 0.5),
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(0.5, 0.0, -0.5),
        Vec3::new(-0.5, 0.0, -0.5),
    ];
    const QUAD_TRIANGLES: [[u32; 3]; 2] = [[0, 1, 3], [1, 2, 3]];

    fn mesh_of(scene: &Scene, index: usize) -> &TriangleMesh {
        match scene.primitives()[index].surface() {
            Surface::Mesh(mesh) => mesh.geometry(),
            other => panic!("expected a mesh, got {other:?}"),
        }
    }

    #[test]
    fn test_fresh_builder_uses_default_material() {
        let mut builder = SceneBuilder::new();
        assert_eq!(*builder.current_material(), Material::Default);
        assert!(builder.has_material(DEFAULT_MATERIAL));

        builder.sphere(Vec3::ZERO, 1.0).unwrap();
        let scene = builder.build();
        assert_eq!(*scene.primitives()[0].material(), Material::Default);
    }

    #[test]
    fn test_transforms_apply_most_recent_first() {
        let mut builder = SceneBuilder::new();
        builder.translate(Vec3::new(0.0, 0.0, -1.0));
        builder.rotate(90.0, Vec3::X).unwrap();
        builder.scale(Vec3::splat(2.0));
        builder.mesh(&QUAD, &QUAD_TRIANGLES).unwrap();
        let scene = builder.build();

        // Unit quad in y = 0 becomes a 2x2 wall at z = -1 facing +z.
        let mesh = mesh_of(&scene, 0);
        for p in mesh.points() {
            assert!((p.z + 1.0).abs() < 1e-5);
            assert!((p.x.abs() - 1.0).abs() < 1e-5);
            assert!((p.y.abs() - 1.0).abs() < 1e-5);
        }
        assert!((mesh.normal_at(0, Vec2::splat(1.0 / 3.0)) - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_push_pop_restores_transform() {
        let mut builder = SceneBuilder::new();
        builder.translate(Vec3::X);
        builder.push_matrix();
        builder.scale(Vec3::splat(3.0));
        builder.pop_matrix().unwrap();
        assert_eq!(builder.transform(), Transform::translate(Vec3::X));

        assert!(matches!(
            builder.pop_matrix(),
            Err(SceneError::StackUnderflow("transform"))
        ));
        assert!(matches!(
            builder.pop_attributes(),
            Err(SceneError::StackUnderflow("attribute"))
        ));
    }

    #[test]
    fn test_attributes_scope_material_and_orientation() {
        let mut builder = SceneBuilder::new();
        let red = Material::matte(Color::new(0.8, 0.1, 0.1));

        builder.push_attributes();
        builder.material("red", red).unwrap();
        builder.set_orientation(Orientation::Inside);
        assert_eq!(*builder.current_material(), red);
        builder.pop_attributes().unwrap();

        assert_eq!(*builder.current_material(), Material::Default);
        assert_eq!(builder.orientation(), Orientation::Outside);

        // The definition outlives the attribute scope.
        builder.set_material("red").unwrap();
        assert_eq!(*builder.current_material(), red);
    }

    #[test]
    fn test_material_name_errors() {
        let mut builder = SceneBuilder::new();
        assert!(matches!(
            builder.set_material("missing"),
            Err(SceneError::UnknownMaterial(name)) if name == "missing"
        ));

        builder.material("white", Material::matte(Color::splat(0.8))).unwrap();
        assert!(matches!(
            builder.material("white", Material::matte(Color::ONE)),
            Err(SceneError::DuplicateMaterial(name)) if name == "white"
        ));
        assert!(builder.material(DEFAULT_MATERIAL, Material::Default).is_err());
    }

    #[test]
    fn test_sphere_transform() {
        let mut builder = SceneBuilder::new();
        builder.translate(Vec3::new(0.0, 2.0, 0.0));
        builder.rotate(30.0, Vec3::Y).unwrap();
        builder.scale(Vec3::splat(2.0));
        builder.sphere(Vec3::new(1.0, 0.0, 0.0), 0.5).unwrap();
        let scene = builder.build();

        let Surface::Sphere(sphere) = scene.primitives()[0].surface() else {
            panic!("expected a sphere");
        };
        assert!((sphere.radius() - 1.0).abs() < 1e-5);
        let angle = 30f32.to_radians();
        let expected = Vec3::new(2.0 * angle.cos(), 2.0, -2.0 * angle.sin());
        assert!((sphere.center() - expected).length() < 1e-4);
    }

    #[test]
    fn test_sphere_rejects_non_uniform_scale() {
        let mut builder = SceneBuilder::new();
        builder.scale(Vec3::new(1.0, 2.0, 1.0));
        assert!(matches!(
            builder.sphere(Vec3::ZERO, 1.0),
            Err(SceneError::NonUniformScale)
        ));
    }

    #[test]
    fn test_sphere_rejects_bad_radius() {
        let mut builder = SceneBuilder::new();
        assert!(matches!(
            builder.sphere(Vec3::ZERO, -1.0),
            Err(SceneError::InvalidRadius(r)) if r == -1.0
        ));
        assert!(matches!(
            builder.sphere(Vec3::ZERO, f32::NAN),
            Err(SceneError::InvalidRadius(_))
        ));
        assert!(builder.sphere(Vec3::ZERO, 0.0).is_ok());
        assert_eq!(builder.build().primitives().len(), 1);
    }

    #[test]
    fn test_rotate_rejects_degenerate_axis() {
        let mut builder = SceneBuilder::new();
        assert!(matches!(
            builder.rotate(90.0, Vec3::ZERO),
            Err(SceneError::InvalidAxis(axis)) if axis == [0.0; 3]
        ));
        assert!(matches!(
            builder.rotate(90.0, Vec3::new(f32::INFINITY, 0.0, 0.0)),
            Err(SceneError::InvalidAxis(_))
        ));

        // A rejected rotation leaves the transform untouched
        builder.mesh(&QUAD, &QUAD_TRIANGLES).unwrap();
        let bounds = builder.build().bounding_box();
        assert!(bounds.min().is_finite() && bounds.max().is_finite());
    }

    #[test]
    fn test_inside_orientation_reverses_winding() {
        let mut builder = SceneBuilder::new();
        builder.set_orientation(Orientation::Inside);
        builder.mesh(&QUAD, &QUAD_TRIANGLES).unwrap();
        let scene = builder.build();

        let mesh = mesh_of(&scene, 0);
        assert_eq!(mesh.triangles(), &[[0, 3, 1], [1, 3, 2]]);
        assert!((mesh.normal_at(0, Vec2::ZERO) + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_normals_use_inverse_transpose_and_flip_inside() {
        let normals = [Vec3::new(1.0, 1.0, 0.0); 4];

        let mut builder = SceneBuilder::new();
        builder.scale(Vec3::new(2.0, 1.0, 1.0));
        builder.mesh_with_normals(&QUAD, None, &normals, &QUAD_TRIANGLES).unwrap();
        builder.set_orientation(Orientation::Inside);
        builder.mesh_with_normals(&QUAD, None, &normals, &QUAD_TRIANGLES).unwrap();
        let scene = builder.build();

        // Inverse-transpose of diag(2,1,1) maps (1,1,0) to (0.5,1,0).
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();
        assert!((mesh_of(&scene, 0).normal_at(0, Vec2::ZERO) - expected).length() < 1e-5);
        assert!((mesh_of(&scene, 1).normal_at(0, Vec2::ZERO) + expected).length() < 1e-5);
    }

    #[test]
    fn test_mesh_from_buffers_validates_lengths() {
        let vertices = [-1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mut builder = SceneBuilder::new();

        assert!(matches!(
            builder.mesh_from_buffers(&vertices[..8], None, None, &[0, 1, 2]),
            Err(SceneError::BufferLength { what: "vertex", len: 8, multiple: 3 })
        ));
        assert!(matches!(
            builder.mesh_from_buffers(&vertices, None, None, &[0, 1]),
            Err(SceneError::BufferLength { what: "index", .. })
        ));
        assert!(matches!(
            builder.mesh_from_buffers(&vertices, Some(&[0.0, 0.0, 1.0]), None, &[0, 1, 2]),
            Err(SceneError::BufferLength { what: "parametric", .. })
        ));
        assert!(matches!(
            builder.mesh_from_buffers(&vertices, Some(&[0.0, 0.0, 1.0, 0.0]), None, &[0, 1, 2]),
            Err(SceneError::Mesh(_))
        ));
        assert!(matches!(
            builder.mesh_from_buffers(&vertices, None, None, &[0, 1, 5]),
            Err(SceneError::Mesh(_))
        ));

        builder
            .mesh_from_buffers(&vertices, Some(&[0.0, 0.0, 1.0, 0.0, 0.5, 1.0]), None, &[0, 1, 2])
            .unwrap();
        let scene = builder.build();
        assert_eq!(scene.len(), 1);
        assert!(mesh_of(&scene, 0).parametrics().is_some());
    }

    #[test]
    fn test_built_scene_is_intersectable() {
        let mut builder = SceneBuilder::new();
        builder.material("light", Material::light(Color::splat(4.0))).unwrap();
        builder.translate(Vec3::new(0.0, 1.0, 0.0));
        builder.rotate(180.0, Vec3::X).unwrap();
        builder.mesh(&QUAD, &QUAD_TRIANGLES).unwrap();
        let scene = builder.build();

        assert_eq!(scene.emitters().count(), 1);
        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.1, 0.0, 0.2), Vec3::Y))
            .unwrap();
        assert!((hit.intersection.ray_parameter() - 1.0).abs() < 1e-5);
        assert!(hit.primitive.material().is_emitter());
    }

    #[test]
    fn test_look_at_matches_camera_frame() {
        let m = look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        assert!((m.transform_point3(Vec3::ZERO) - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
        assert!((m.transform_vector3(Vec3::NEG_Z) - Vec3::NEG_Z).length() < 1e-5);
    }
}
