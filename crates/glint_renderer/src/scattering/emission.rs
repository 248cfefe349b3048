use super::{Color, BLACK};
use glint_math::Vec3;
use std::f32::consts::PI;

/// Lambertian emitter radiating into the hemisphere around the normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphericalEmission {
    radiance: Color,
}

impl HemisphericalEmission {
    /// Emitter with the given outgoing radiance.
    pub fn new(radiance: Color) -> Self {
        Self { radiance }
    }

    /// Emitter with the given radiosity (power per area).
    pub fn from_radiosity(radiosity: Color) -> Self {
        Self::new(radiosity / PI)
    }

    pub fn radiance(&self) -> Color {
        self.radiance
    }

    /// Emission does not scatter.
    pub fn evaluate(&self, _wo: Vec3, _wi: Vec3) -> Color {
        BLACK
    }

    /// Radiance leaving in local direction `wo`; black behind the surface.
    pub fn emitted(&self, wo: Vec3) -> Color {
        if wo.z > 0.0 {
            self.radiance
        } else {
            BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radiosity_to_radiance() {
        let emission = HemisphericalEmission::from_radiosity(Color::splat(PI * 2.0));
        assert!((emission.radiance() - Color::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn test_one_sided() {
        let emission = HemisphericalEmission::new(Color::ONE);
        assert_eq!(emission.emitted(Vec3::new(0.3, 0.1, 0.5)), Color::ONE);
        assert_eq!(emission.emitted(Vec3::new(0.3, 0.1, -0.5)), BLACK);
        assert_eq!(emission.emitted(Vec3::X), BLACK);
    }
}
