//! The closed set of renderable surfaces.

use crate::{DifferentialGeometry, Mesh, Sphere};
use glint_math::{Aabb, Ray};

/// A ray hit on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    t: f32,
    dg: DifferentialGeometry,
}

impl Intersection {
    pub fn new(t: f32, dg: DifferentialGeometry) -> Self {
        Self { t, dg }
    }

    /// Ray parameter of the hit.
    pub fn ray_parameter(&self) -> f32 {
        self.t
    }

    pub fn differential_geometry(&self) -> &DifferentialGeometry {
        &self.dg
    }
}

/// A surface: either an analytic sphere or a triangle mesh.
#[derive(Debug, Clone)]
pub enum Surface {
    Sphere(Sphere),
    Mesh(Mesh),
}

impl Surface {
    /// Nearest hit within the ray's interval.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Surface::Sphere(sphere) => sphere.intersect(ray),
            Surface::Mesh(mesh) => mesh.intersect(ray),
        }
    }

    /// Any hit within the ray's interval.
    pub fn is_intersected(&self, ray: &Ray) -> bool {
        match self {
            Surface::Sphere(sphere) => sphere.is_intersected(ray),
            Surface::Mesh(mesh) => mesh.is_intersected(ray),
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Surface::Sphere(sphere) => sphere.area(),
            Surface::Mesh(mesh) => mesh.area(),
        }
    }

    /// Sample a point with density uniform in area.
    pub fn sample_surface(&self, u0: f32, u1: f32) -> DifferentialGeometry {
        match self {
            Surface::Sphere(sphere) => sphere.sample_surface(u0, u1),
            Surface::Mesh(mesh) => mesh.sample_surface(u0, u1),
        }
    }

    /// Area density of [`sample_surface`](Self::sample_surface); zero for a
    /// surface without area.
    pub fn pdf(&self, _dg: &DifferentialGeometry) -> f32 {
        let area = self.area();
        if area > 0.0 {
            1.0 / area
        } else {
            0.0
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Surface::Sphere(sphere) => sphere.bounding_box(),
            Surface::Mesh(mesh) => mesh.bounding_box(),
        }
    }
}

impl From<Sphere> for Surface {
    fn from(sphere: Sphere) -> Self {
        Surface::Sphere(sphere)
    }
}

impl From<Mesh> for Surface {
    fn from(mesh: Mesh) -> Self {
        Surface::Mesh(mesh)
    }
}
