// Affine transforms with role-aware application.
//
// Points, vectors and normals share `Vec3` storage, so the role is chosen by
// the method used: `point` applies translation, `vector` does not, and
// `normal` applies the inverse-transpose.

use crate::{Aabb, Mat3, Mat4, Ray, Vec3};
use std::ops::Mul;

/// Relative tolerance used when deciding whether a scale is uniform.
const UNIFORM_SCALE_TOLERANCE: f32 = 1e-4;

/// An affine transform with its inverse cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
    };

    /// Wrap a matrix, computing its inverse.
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn translate(offset: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(offset),
            inverse: Mat4::from_translation(-offset),
        }
    }

    /// Rotation of `degrees` about `axis` (need not be normalized).
    pub fn rotate(degrees: f32, axis: Vec3) -> Self {
        let rotation = Mat4::from_axis_angle(axis.normalize(), degrees.to_radians());
        Self {
            matrix: rotation,
            inverse: rotation.transpose(),
        }
    }

    pub fn scale(factors: Vec3) -> Self {
        Self {
            matrix: Mat4::from_scale(factors),
            inverse: Mat4::from_scale(factors.recip()),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn inverse(&self) -> Transform {
        Transform {
            matrix: self.inverse,
            inverse: self.matrix,
        }
    }

    /// Transform a position (translation applies).
    #[inline]
    pub fn point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    /// Transform a direction (translation does not apply).
    #[inline]
    pub fn vector(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// Transform a surface normal by the inverse-transpose and renormalize.
    #[inline]
    pub fn normal(&self, n: Vec3) -> Vec3 {
        self.inverse.transpose().transform_vector3(n).normalize_or_zero()
    }

    /// Transform a ray, keeping its parameter range.
    pub fn ray(&self, r: &Ray) -> Ray {
        Ray {
            origin: self.point(r.origin),
            direction: self.vector(r.direction),
            interval: r.interval,
        }
    }

    /// Computes the bounding box of all 8 transformed corners.
    pub fn aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());
        let corners = (0..8).map(|i| {
            self.point(Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            ))
        });
        Aabb::enclosing(corners)
    }

    /// The scale factor when the linear part is a rotation times a uniform
    /// scale, `None` otherwise.
    pub fn uniform_scale(&self) -> Option<f32> {
        let linear = Mat3::from_mat4(self.matrix);
        let gram = linear.transpose() * linear;
        let s2 = (gram.x_axis.x + gram.y_axis.y + gram.z_axis.z) / 3.0;
        if s2 <= 0.0 {
            return None;
        }

        let tolerance = UNIFORM_SCALE_TOLERANCE * s2;
        let uniform = (0..3).all(|col| {
            (0..3).all(|row| {
                let expected = if row == col { s2 } else { 0.0 };
                (gram.col(col)[row] - expected).abs() <= tolerance
            })
        });

        uniform.then(|| s2.sqrt())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `a * b` applies `b` first, matching matrix multiplication.
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            matrix: self.matrix * rhs.matrix,
            inverse: rhs.inverse * self.inverse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_point_translation() {
        let xfrm = Transform::translate(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(xfrm.point(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(11.0, 22.0, 33.0));
    }

    #[test]
    fn test_vector_ignores_translation() {
        let xfrm = Transform::translate(Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(xfrm.vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_rotation() {
        let xfrm = Transform::rotate(90.0, Vec3::Z);
        assert!(close(xfrm.vector(Vec3::X), Vec3::Y));
        assert!(close(xfrm.inverse().vector(Vec3::Y), Vec3::X));
    }

    #[test]
    fn test_normal_uses_inverse_transpose() {
        // A plane tilted 45 degrees, then squashed along y
        let xfrm = Transform::scale(Vec3::new(1.0, 0.5, 1.0));
        let tangent = Vec3::new(1.0, -1.0, 0.0).normalize();
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();

        let t = xfrm.vector(tangent);
        let n = xfrm.normal(normal);

        // Transformed normal stays perpendicular to transformed tangent
        assert!(t.dot(n).abs() < 1e-5);
        // Naively transforming the normal as a vector does not
        assert!(t.dot(xfrm.vector(normal).normalize()).abs() > 0.1);
    }

    #[test]
    fn test_composition_order() {
        let xfrm = Transform::translate(Vec3::X) * Transform::scale(Vec3::splat(2.0));
        // Scale first, then translate
        assert!(close(xfrm.point(Vec3::ONE), Vec3::new(3.0, 2.0, 2.0)));
        assert!(close(xfrm.inverse().point(Vec3::new(3.0, 2.0, 2.0)), Vec3::ONE));
    }

    #[test]
    fn test_uniform_scale() {
        assert_eq!(Transform::IDENTITY.uniform_scale(), Some(1.0));

        let uniform = Transform::rotate(30.0, Vec3::new(1.0, 1.0, 0.0))
            * Transform::scale(Vec3::splat(2.0))
            * Transform::translate(Vec3::new(4.0, 0.0, 1.0));
        let s = uniform.uniform_scale().unwrap();
        assert!((s - 2.0).abs() < 1e-4);

        let squashed = Transform::scale(Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(squashed.uniform_scale(), None);
    }

    #[test]
    fn test_aabb_translation() {
        let xfrm = Transform::translate(Vec3::splat(5.0));
        let aabb = xfrm.aabb(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));

        assert!(close(aabb.min(), Vec3::splat(5.0)));
        assert!(close(aabb.max(), Vec3::splat(6.0)));
    }
}
