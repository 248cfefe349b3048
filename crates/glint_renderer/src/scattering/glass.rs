use super::{
    luminance, Color, Fresnel, ScatteringSample, SpecularReflection, SpecularTransmission, BLACK,
};
use glint_math::Vec3;

/// Smooth glass: specular reflection and transmission sharing one
/// dielectric interface.
///
/// Sampling picks one branch with probability proportional to its
/// luminance and divides the branch's throughput by that probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfectGlass {
    reflection: SpecularReflection,
    transmission: SpecularTransmission,
}

impl PerfectGlass {
    pub fn new(reflectance: Color, transmittance: Color, eta_i: f32, eta_t: f32) -> Self {
        Self {
            reflection: SpecularReflection::new(reflectance, Fresnel::dielectric(eta_i, eta_t)),
            transmission: SpecularTransmission::new(transmittance, eta_i, eta_t),
        }
    }

    pub fn evaluate(&self, _wo: Vec3, _wi: Vec3) -> Color {
        BLACK
    }

    pub fn emitted(&self, _wo: Vec3) -> Color {
        BLACK
    }

    /// Probability of choosing the reflected branch for `wo`, or `None` when
    /// neither branch carries any energy.
    pub fn reflection_probability(&self, wo: Vec3) -> Option<f32> {
        let reflected = luminance(self.reflection.sample(wo).throughput);
        let transmitted = luminance(self.transmission.sample(wo).throughput);
        let total = reflected + transmitted;

        (total > 0.0).then(|| reflected / total)
    }

    pub fn sample(&self, u0: f32, wo: Vec3) -> ScatteringSample {
        let reflected = self.reflection.sample(wo);
        let transmitted = self.transmission.sample(wo);

        let reflected_importance = luminance(reflected.throughput);
        let transmitted_importance = luminance(transmitted.throughput);
        let total = reflected_importance + transmitted_importance;
        if total <= 0.0 {
            return ScatteringSample::delta(Vec3::ZERO, BLACK, 0.0);
        }

        let reflected_probability = reflected_importance / total;
        if u0 < reflected_probability {
            ScatteringSample::delta(
                reflected.wi,
                reflected.throughput / reflected_probability,
                reflected_probability,
            )
        } else {
            let transmitted_probability = 1.0 - reflected_probability;
            ScatteringSample::delta(
                transmitted.wi,
                transmitted.throughput / transmitted_probability,
                transmitted_probability,
            )
        }
    }
}
