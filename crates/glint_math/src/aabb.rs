use crate::{Interval, Ray, Vec3};

/// Thickness given to bounds that are flat along an axis, so slab tests
/// against planar geometry still succeed.
const MIN_EXTENT: f32 = 1e-4;

/// Axis-aligned bounding box stored as its two corners.
///
/// `EMPTY` has inverted corners so that it is the identity for
/// [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    lo: Vec3,
    hi: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        lo: Vec3::INFINITY,
        hi: Vec3::NEG_INFINITY,
    };

    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let (lo, hi) = (a.min(b), a.max(b));
        let pad = Vec3::select(
            (hi - lo).cmplt(Vec3::splat(MIN_EXTENT)),
            Vec3::splat(MIN_EXTENT / 2.0),
            Vec3::ZERO,
        );
        Self {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    /// Smallest box containing every point, or `EMPTY` for no points.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::EMPTY;
        };
        let (lo, hi) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Self::from_points(lo, hi)
    }

    /// Union of two boxes.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            lo: a.lo.min(b.lo),
            hi: a.hi.max(b.hi),
        }
    }

    pub fn min(&self) -> Vec3 {
        self.lo
    }

    pub fn max(&self) -> Vec3 {
        self.hi
    }

    pub fn is_empty(&self) -> bool {
        self.lo.cmpgt(self.hi).any()
    }

    pub fn extent(&self) -> Vec3 {
        self.hi - self.lo
    }

    pub fn centroid(&self) -> Vec3 {
        (self.lo + self.hi) * 0.5
    }

    /// Index of the widest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            0
        } else if e.y > e.z {
            1
        } else {
            2
        }
    }

    /// Slab test: does the ray pass through the box for some `t` in `range`?
    pub fn hit(&self, ray: &Ray, range: Interval) -> bool {
        let inv = ray.direction.recip();
        let t0 = (self.lo - ray.origin) * inv;
        let t1 = (self.hi - ray.origin) * inv;

        // NaN from 0 * inf (origin on a slab plane, axis-parallel ray) is
        // dropped by f32::max/min, leaving the other bounds in charge.
        let near = t0.min(t1).max_element().max(range.min);
        let far = t0.max(t1).min_element().min(range.max);
        near <= far
    }
}
