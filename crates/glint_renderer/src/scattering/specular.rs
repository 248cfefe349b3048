//! Delta distributions: perfect mirror reflection and refraction.

use super::{Color, Fresnel, ScatteringSample, BLACK};
use glint_math::Vec3;

/// Perfect mirror reflection modulated by a Fresnel term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularReflection {
    reflectance: Color,
    fresnel: Fresnel,
}

impl SpecularReflection {
    pub fn new(reflectance: Color, fresnel: Fresnel) -> Self {
        Self { reflectance, fresnel }
    }

    /// Always black: an arbitrary `wi` is never the mirror direction.
    pub fn evaluate(&self, _wo: Vec3, _wi: Vec3) -> Color {
        BLACK
    }

    pub fn emitted(&self, _wo: Vec3) -> Color {
        BLACK
    }

    /// The mirror direction of `wo` about the local normal.
    pub fn sample(&self, wo: Vec3) -> ScatteringSample {
        let wi = Vec3::new(-wo.x, -wo.y, wo.z);
        let throughput = self.fresnel.evaluate(wo.z) * self.reflectance;
        ScatteringSample::delta(wi, throughput, 1.0)
    }
}

/// Perfect refraction through a dielectric interface.
///
/// `eta_i` is the index on the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecularTransmission {
    transmittance: Color,
    eta_i: f32,
    eta_t: f32,
}

impl SpecularTransmission {
    pub fn new(transmittance: Color, eta_i: f32, eta_t: f32) -> Self {
        Self {
            transmittance,
            eta_i,
            eta_t,
        }
    }

    pub fn evaluate(&self, _wo: Vec3, _wi: Vec3) -> Color {
        BLACK
    }

    pub fn emitted(&self, _wo: Vec3) -> Color {
        BLACK
    }

    /// Refract `wo` by Snell's law.
    ///
    /// Returns the refracted direction and the relative index `eta_i / eta_t`
    /// seen from `wo`'s side, or `None` under total internal reflection.
    pub fn refract(&self, wo: Vec3) -> Option<(Vec3, f32)> {
        let entering = wo.z > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_i, self.eta_t)
        } else {
            (self.eta_t, self.eta_i)
        };

        let eta = eta_i / eta_t;
        let sin2_i = (1.0 - wo.z * wo.z).max(0.0);
        let sin2_t = eta * eta * sin2_i;
        if sin2_t >= 1.0 {
            return None;
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let z = if entering { -cos_t } else { cos_t };
        Some((Vec3::new(-eta * wo.x, -eta * wo.y, z), eta))
    }

    /// The refracted direction; zero direction and black throughput under
    /// total internal reflection.
    pub fn sample(&self, wo: Vec3) -> ScatteringSample {
        match self.refract(wo) {
            Some((wi, eta)) => {
                let fresnel = Fresnel::dielectric(self.eta_i, self.eta_t).evaluate(wo.z);
                let throughput = eta * eta * (Color::ONE - fresnel) * self.transmittance;
                ScatteringSample::delta(wi, throughput, 1.0)
            }
            None => ScatteringSample::delta(Vec3::ZERO, BLACK, 1.0),
        }
    }
}
