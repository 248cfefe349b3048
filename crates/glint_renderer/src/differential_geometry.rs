//! Local geometry at a surface point and the shading frame built from it.

use glint_math::{Vec2, Vec3};

/// Below this squared length a partial derivative is treated as degenerate.
const DEGENERATE_LENGTH_SQUARED: f32 = 1e-12;

/// Geometry of a surface at a single point.
///
/// Besides the raw record (position, parametric coordinates, partial
/// derivatives and shading normal) this carries an orthonormal frame
/// `(tangent, bitangent, normal)`. Scattering functions are written in that
/// frame, where `z` is the normal, so [`localize`](Self::localize) and
/// [`globalize`](Self::globalize) are the only place world orientation
/// enters shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialGeometry {
    point: Vec3,
    parametric: Vec2,
    dpdu: Vec3,
    dpdv: Vec3,
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
}

impl DifferentialGeometry {
    /// Build the record and its shading frame.
    ///
    /// The tangent is `dpdu` made orthogonal to the normal. When that is
    /// degenerate (poles of a sphere, collapsed parametrics) `dpdv` is tried,
    /// then an arbitrary basis around the normal.
    pub fn new(point: Vec3, parametric: Vec2, dpdu: Vec3, dpdv: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or(Vec3::Z);

        let project = |v: Vec3| v - normal * normal.dot(v);
        let from_dpdu = project(dpdu);
        let from_dpdv = project(dpdv);

        let (tangent, bitangent) = if from_dpdu.length_squared() > DEGENERATE_LENGTH_SQUARED {
            let tangent = from_dpdu.normalize();
            (tangent, normal.cross(tangent))
        } else if from_dpdv.length_squared() > DEGENERATE_LENGTH_SQUARED {
            let bitangent = from_dpdv.normalize();
            (bitangent.cross(normal), bitangent)
        } else {
            normal.any_orthonormal_pair()
        };

        Self {
            point,
            parametric,
            dpdu,
            dpdv,
            normal,
            tangent,
            bitangent,
        }
    }

    #[inline]
    pub fn point(&self) -> Vec3 {
        self.point
    }

    #[inline]
    pub fn parametric(&self) -> Vec2 {
        self.parametric
    }

    #[inline]
    pub fn dpdu(&self) -> Vec3 {
        self.dpdu
    }

    #[inline]
    pub fn dpdv(&self) -> Vec3 {
        self.dpdv
    }

    /// Unit shading normal.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[inline]
    pub fn tangent(&self) -> Vec3 {
        self.tangent
    }

    #[inline]
    pub fn bitangent(&self) -> Vec3 {
        self.bitangent
    }

    /// Express a world-space vector in the local shading frame.
    #[inline]
    pub fn localize(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.tangent), v.dot(self.bitangent), v.dot(self.normal))
    }

    /// Express a local-frame vector in world space.
    #[inline]
    pub fn globalize(&self, v: Vec3) -> Vec3 {
        v.x * self.tangent + v.y * self.bitangent + v.z * self.normal
    }

    /// |cos θ| of a local-frame direction against the normal.
    #[inline]
    pub fn abs_cos_theta(&self, local: Vec3) -> f32 {
        local.z.abs()
    }

    #[inline]
    pub fn distance_squared(&self, other: &DifferentialGeometry) -> f32 {
        self.point.distance_squared(other.point)
    }
}
