//! Triangle meshes.
//!
//! [`TriangleMesh`] owns validated vertex and index arrays and answers
//! per-triangle questions. [`Mesh`] is the renderable surface built from it:
//! it adds a BVH for ray queries and an area-weighted alias table for
//! sampling points uniformly over the whole surface.

use crate::{AliasTable, Bvh, DifferentialGeometry, Intersection};
use glint_math::{Aabb, Ray, Vec2, Vec3};
use thiserror::Error;

/// Errors raised while assembling a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("mesh has no triangles")]
    Empty,

    #[error("mesh has {parametrics} parametrics for {points} points")]
    ParametricCount { points: usize, parametrics: usize },

    #[error("mesh has {normals} normals; expected {points} (per vertex) or {triangles} (per face)")]
    NormalCount {
        points: usize,
        triangles: usize,
        normals: usize,
    },

    #[error("triangle {triangle} references vertex {index} but the mesh has {points} points")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        points: usize,
    },
}

/// Shading normals of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum Normals {
    /// One normal per vertex, interpolated across each triangle.
    Vertex(Vec<Vec3>),
    /// One normal per triangle, constant across it.
    Face(Vec<Vec3>),
}

/// Parametrics assumed for every triangle of a mesh without its own.
const DEFAULT_PARAMETRICS: [Vec2; 3] =
    [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)];

/// Vertex and index data of a triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    points: Vec<Vec3>,
    parametrics: Option<Vec<Vec2>>,
    normals: Normals,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from points and triangles; face normals follow the
    /// counter-clockwise winding of each triangle.
    pub fn new(points: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        Self::assemble(points, None, None, triangles)
    }

    /// Create a mesh with per-vertex parametric coordinates.
    pub fn with_parametrics(
        points: Vec<Vec3>,
        parametrics: Vec<Vec2>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        Self::assemble(points, Some(parametrics), None, triangles)
    }

    /// Create a mesh with explicit normals.
    ///
    /// `normals` is per vertex when its length equals the point count,
    /// otherwise per face when it equals the triangle count.
    pub fn with_normals(
        points: Vec<Vec3>,
        parametrics: Option<Vec<Vec2>>,
        normals: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        Self::assemble(points, parametrics, Some(normals), triangles)
    }

    fn assemble(
        points: Vec<Vec3>,
        parametrics: Option<Vec<Vec2>>,
        normals: Option<Vec<Vec3>>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, MeshError> {
        if triangles.is_empty() {
            return Err(MeshError::Empty);
        }

        if let Some(parametrics) = &parametrics {
            if parametrics.len() != points.len() {
                return Err(MeshError::ParametricCount {
                    points: points.len(),
                    parametrics: parametrics.len(),
                });
            }
        }

        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= points.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    points: points.len(),
                });
            }
        }

        let normals = match normals {
            Some(normals) if normals.len() == points.len() => {
                Normals::Vertex(normals.into_iter().map(|n| n.normalize_or_zero()).collect())
            }
            Some(normals) if normals.len() == triangles.len() => {
                Normals::Face(normals.into_iter().map(|n| n.normalize_or_zero()).collect())
            }
            Some(normals) => {
                return Err(MeshError::NormalCount {
                    points: points.len(),
                    triangles: triangles.len(),
                    normals: normals.len(),
                })
            }
            None => Normals::Face(
                triangles
                    .iter()
                    .map(|tri| {
                        let [p0, p1, p2] = tri.map(|i| points[i as usize]);
                        (p1 - p0).cross(p2 - p0).normalize_or_zero()
                    })
                    .collect(),
            ),
        };

        Ok(Self {
            points,
            parametrics,
            normals,
            triangles,
        })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn parametrics(&self) -> Option<&[Vec2]> {
        self.parametrics.as_deref()
    }

    pub fn normals(&self) -> &Normals {
        &self.normals
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn vertices(&self, tri: usize) -> [Vec3; 3] {
        self.triangles[tri].map(|i| self.points[i as usize])
    }

    fn vertex_parametrics(&self, tri: usize) -> [Vec2; 3] {
        match &self.parametrics {
            Some(uvs) => self.triangles[tri].map(|i| uvs[i as usize]),
            None => DEFAULT_PARAMETRICS,
        }
    }

    /// Surface area of one triangle.
    pub fn surface_area(&self, tri: usize) -> f32 {
        let [p0, p1, p2] = self.vertices(tri);
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Bounds of one triangle.
    pub fn triangle_bounds(&self, tri: usize) -> Aabb {
        Aabb::enclosing(self.vertices(tri))
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns `(t, b)` where `b.x` and `b.y` weight vertices 1 and 2 and
    /// vertex 0 gets `1 - b.x - b.y`. Only hits inside the ray's interval
    /// are reported.
    pub fn intersect_triangle(&self, tri: usize, ray: &Ray) -> Option<(f32, Vec2)> {
        let [p0, p1, p2] = self.vertices(tri);
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to the triangle, or the triangle is degenerate
        if det == 0.0 {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - p0;
        let b0 = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&b0) {
            return None;
        }

        let q = s.cross(edge1);
        let b1 = inv_det * ray.direction.dot(q);
        if !(0.0..=1.0).contains(&b1) || b0 + b1 > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        ray.contains(t).then(|| (t, Vec2::new(b0, b1)))
    }

    /// Barycentric weights `(w0, w1, w2)` for `b`.
    #[inline]
    fn weights(b: Vec2) -> Vec3 {
        Vec3::new(1.0 - b.x - b.y, b.x, b.y)
    }

    /// Position at barycentric coordinates `b` of a triangle.
    pub fn position_at(&self, tri: usize, b: Vec2) -> Vec3 {
        let [p0, p1, p2] = self.vertices(tri);
        let w = Self::weights(b);
        w.x * p0 + w.y * p1 + w.z * p2
    }

    /// Parametric coordinates at `b`.
    pub fn parametric_at(&self, tri: usize, b: Vec2) -> Vec2 {
        let [uv0, uv1, uv2] = self.vertex_parametrics(tri);
        let w = Self::weights(b);
        w.x * uv0 + w.y * uv1 + w.z * uv2
    }

    /// Shading normal at `b`.
    pub fn normal_at(&self, tri: usize, b: Vec2) -> Vec3 {
        match &self.normals {
            Normals::Face(normals) => normals[tri],
            Normals::Vertex(normals) => {
                let [n0, n1, n2] = self.triangles[tri].map(|i| normals[i as usize]);
                let w = Self::weights(b);
                (w.x * n0 + w.y * n1 + w.z * n2).normalize_or_zero()
            }
        }
    }

    /// Partial derivatives `(dp/du, dp/dv)` of a triangle's parametrization.
    ///
    /// Zero vectors when the parametrics are degenerate.
    pub fn partial_derivatives(&self, tri: usize) -> (Vec3, Vec3) {
        let [p0, p1, p2] = self.vertices(tri);
        let [uv0, uv1, uv2] = self.vertex_parametrics(tri);

        let duv02 = uv0 - uv2;
        let duv12 = uv1 - uv2;
        let dp02 = p0 - p2;
        let dp12 = p1 - p2;

        let determinant = duv02.x * duv12.y - duv02.y * duv12.x;
        if determinant.abs() < 1e-12 {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let inv = 1.0 / determinant;
        let dpdu = (duv12.y * dp02 - duv02.y * dp12) * inv;
        let dpdv = (-duv12.x * dp02 + duv02.x * dp12) * inv;
        (dpdu, dpdv)
    }

    /// Full differential geometry at `b` on a triangle.
    pub fn differential_geometry(&self, tri: usize, b: Vec2) -> DifferentialGeometry {
        let (dpdu, dpdv) = self.partial_derivatives(tri);
        DifferentialGeometry::new(
            self.position_at(tri, b),
            self.parametric_at(tri, b),
            dpdu,
            dpdv,
            self.normal_at(tri, b),
        )
    }
}

/// A triangle mesh surface with its acceleration structures.
#[derive(Debug, Clone)]
pub struct Mesh {
    geometry: TriangleMesh,
    bvh: Bvh,
    area_distribution: AliasTable,
    area: f32,
}

impl Mesh {
    /// Build the BVH and area distribution for a mesh.
    pub fn new(geometry: TriangleMesh) -> Self {
        let n = geometry.triangle_count();
        let bounds: Vec<Aabb> = (0..n).map(|tri| geometry.triangle_bounds(tri)).collect();
        let areas: Vec<f32> = (0..n).map(|tri| geometry.surface_area(tri)).collect();

        let bvh = Bvh::new(&bounds);
        let area_distribution = AliasTable::new(&areas);
        let area = areas.iter().sum();

        log::debug!(
            "Built mesh: {} triangles, {} BVH nodes, area {:.4}",
            n,
            bvh.node_count(),
            area
        );

        Self {
            geometry,
            bvh,
            area_distribution,
            area,
        }
    }

    pub fn geometry(&self) -> &TriangleMesh {
        &self.geometry
    }

    /// Nearest hit over all triangles.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let (tri, t, b) = self
            .bvh
            .closest(ray, |tri, ray| self.geometry.intersect_triangle(tri, ray))?;

        Some(Intersection::new(t, self.geometry.differential_geometry(tri, b)))
    }

    /// Whether any triangle is hit.
    pub fn is_intersected(&self, ray: &Ray) -> bool {
        self.bvh
            .any(ray, |tri, ray| self.geometry.intersect_triangle(tri, ray).is_some())
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        self.area
    }

    /// Sample a point uniformly by area.
    ///
    /// `u0` picks the triangle (with probability proportional to its area)
    /// and, after remapping, together with `u1` picks the point inside it.
    pub fn sample_surface(&self, u0: f32, u1: f32) -> DifferentialGeometry {
        let (tri, u0) = match self.area_distribution.sample(u0) {
            Some(s) => (s.index, s.remapped),
            None => (0, u0),
        };

        // Square-root warp keeps the density uniform in area
        let su = u0.sqrt();
        let b = Vec2::new(u1 * su, su * (1.0 - u1));

        self.geometry.differential_geometry(tri, b)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }
}
