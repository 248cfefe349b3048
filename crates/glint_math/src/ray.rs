use crate::{Interval, Vec3};

/// Smallest ray parameter considered a hit; keeps secondary rays from
/// re-hitting the surface they leave.
pub const RAY_EPSILON: f32 = 1e-4;

/// Gap left before the far endpoint of a point-to-point ray so the target
/// surface does not occlude itself.
pub const SHADOW_EPSILON: f32 = 1e-3;

/// A ray in 3D space with origin, direction, and a valid parameter range.
///
/// A point `at(t)` only counts as a hit when `t` lies in the half-open
/// interval `[interval.min, interval.max)`. Traversals shrink the interval
/// with [`Ray::end`] as closer hits are found.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub interval: Interval,
}

impl Ray {
    /// Create a ray extending to infinity.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_max(origin, direction, f32::INFINITY)
    }

    /// Create a ray whose valid range ends at `t_max`.
    pub fn with_max(origin: Vec3, direction: Vec3, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            interval: Interval::new(RAY_EPSILON, t_max),
        }
    }

    /// Create a ray from `origin` towards `end`, parameterized so that
    /// `at(1.0) == end`. The range stops just short of `end`.
    pub fn between(origin: Vec3, end: Vec3) -> Self {
        Self::with_max(origin, end - origin, 1.0 - SHADOW_EPSILON)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the valid parameter range.
    #[inline]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Whether `t` falls within `[t_min, t_max)`.
    #[inline]
    pub fn contains(&self, t: f32) -> bool {
        self.interval.admits(t)
    }

    /// Shrink the far end of the valid range to `t`.
    #[inline]
    pub fn end(&mut self, t: f32) {
        self.interval = self.interval.clamp_max(t);
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
