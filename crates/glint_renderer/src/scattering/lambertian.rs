use super::{Color, BLACK, WHITE};
use glint_math::Vec3;
use std::f32::consts::FRAC_1_PI;

/// Ideal diffuse reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo_over_pi: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo_over_pi: albedo * FRAC_1_PI,
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo_over_pi / FRAC_1_PI
    }

    /// `albedo / π` for every pair of directions. Hemisphere checks and the
    /// cosine factor belong to the caller.
    pub fn evaluate(&self, _wo: Vec3, _wi: Vec3) -> Color {
        self.albedo_over_pi
    }

    pub fn emitted(&self, _wo: Vec3) -> Color {
        BLACK
    }
}

impl Default for Lambertian {
    fn default() -> Self {
        Self::new(WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f32::consts::PI;

    fn random_unit(rng: &mut StdRng) -> Vec3 {
        let z: f32 = rng.gen_range(-1.0..1.0);
        let phi = rng.gen_range(0.0..2.0 * PI);
        let r = (1.0 - z * z).sqrt();
        Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    #[test]
    fn test_bounded_by_albedo_over_pi() {
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
            let brdf = Lambertian::new(albedo);
            let bound = albedo / PI;

            for _ in 0..20 {
                let f = brdf.evaluate(random_unit(&mut rng), random_unit(&mut rng));
                assert!(f.min_element() >= 0.0);
                assert!(f.cmple(bound + Vec3::splat(1e-6)).all(), "{f:?} > {bound:?}");
            }
        }
    }

    #[test]
    fn test_does_not_emit() {
        assert_eq!(Lambertian::default().emitted(Vec3::Z), BLACK);
        assert!((Lambertian::default().albedo() - WHITE).length() < 1e-6);
    }
}
