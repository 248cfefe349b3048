//! Sphere primitive for ray tracing.

use crate::{DifferentialGeometry, Intersection};
use glint_math::{Aabb, Ray, Vec2, Vec3};
use std::f32::consts::PI;

/// An analytic sphere.
///
/// Parametrized by longitude and latitude about the z axis:
/// `u = φ / 2π`, `v = θ / π` with `θ` measured from `+z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    pub fn bounding_box(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    /// Nearest hit within the ray's interval.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        if a == 0.0 {
            return None;
        }

        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray.contains(root) {
            root = (h + sqrtd) / a;
            if !ray.contains(root) {
                return None;
            }
        }

        let p = ray.at(root);
        Some(Intersection::new(root, self.differential_geometry(p)))
    }

    /// Whether the ray hits the sphere anywhere in its interval.
    pub fn is_intersected(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Sample a point uniformly by area.
    pub fn sample_surface(&self, u0: f32, u1: f32) -> DifferentialGeometry {
        let z = 1.0 - 2.0 * u0;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * u1;
        let direction = Vec3::new(r * phi.cos(), r * phi.sin(), z);

        self.differential_geometry(self.center + self.radius * direction)
    }

    /// Geometry at a point on (or projected onto) the sphere.
    fn differential_geometry(&self, p: Vec3) -> DifferentialGeometry {
        let local = p - self.center;
        let normal = local.normalize_or(Vec3::Z);
        let local = normal * self.radius;

        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = normal.z.clamp(-1.0, 1.0).acos();

        let parametric = Vec2::new(phi / (2.0 * PI), theta / PI);

        let dpdu = 2.0 * PI * Vec3::new(-local.y, local.x, 0.0);
        let dpdv = PI
            * Vec3::new(
                local.z * phi.cos(),
                local.z * phi.sin(),
                -self.radius * theta.sin(),
            );

        DifferentialGeometry::new(p, parametric, dpdu, dpdv, normal)
    }
}
