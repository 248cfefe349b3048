/// A range `[min, max]` of ray parameters.
///
/// Rays treat the far end as open; see [`Interval::admits`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// `min <= t <= max`.
    pub fn contains(&self, t: f32) -> bool {
        self.min <= t && t <= self.max
    }

    /// `min <= t < max`, the test used for ray hits.
    pub fn admits(&self, t: f32) -> bool {
        self.min <= t && t < self.max
    }

    /// This range with `max` lowered to `t`; never widens.
    pub fn clamp_max(self, t: f32) -> Interval {
        Interval::new(self.min, self.max.min(t))
    }
}
