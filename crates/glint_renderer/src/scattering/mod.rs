//! Scattering functions.
//!
//! Every function is written in the local shading frame of a
//! [`DifferentialGeometry`](crate::DifferentialGeometry): `z` is the shading
//! normal, so `cos θ` of a direction is just its `z` component. Callers
//! localize world directions before evaluating and globalize sampled
//! directions afterwards.
//!
//! [`ScatteringFunction`] is a closed set dispatched by `match`. Delta
//! variants (mirror, refraction, glass) evaluate to black and can only be
//! sampled; the sample says so through [`ScatteringSample::is_delta`].

mod emission;
mod fresnel;
mod glass;
mod lambertian;
mod specular;

pub use emission::HemisphericalEmission;
pub use fresnel::{approximate_absorption, Fresnel};
pub use glass::PerfectGlass;
pub use lambertian::Lambertian;
pub use specular::{SpecularReflection, SpecularTransmission};

use glint_math::Vec3;
use std::f32::consts::{FRAC_1_PI, PI};

/// Color type alias (linear RGB)
pub type Color = Vec3;

pub const BLACK: Color = Color::ZERO;
pub const WHITE: Color = Color::ONE;

/// Rec. 709 luminance.
#[inline]
pub fn luminance(c: Color) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Result of sampling a scattering function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringSample {
    /// Sampled direction in the local frame
    pub wi: Vec3,
    /// For continuous samples `f(wo, wi)`; for delta samples the full
    /// weight, cosine and density already folded in
    pub throughput: Color,
    /// Solid-angle density for continuous samples; for delta samples the
    /// probability of the chosen branch
    pub pdf: f32,
    /// Whether `wi` came from a delta distribution
    pub is_delta: bool,
}

impl ScatteringSample {
    pub fn delta(wi: Vec3, throughput: Color, pdf: f32) -> Self {
        Self {
            wi,
            throughput,
            pdf,
            is_delta: true,
        }
    }

    pub fn continuous(wi: Vec3, throughput: Color, pdf: f32) -> Self {
        Self {
            wi,
            throughput,
            pdf,
            is_delta: false,
        }
    }
}

/// Cosine-weighted direction in the `+z` hemisphere.
pub fn cosine_hemisphere(u0: f32, u1: f32) -> Vec3 {
    let r = u0.sqrt();
    let phi = 2.0 * PI * u1;
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u0).max(0.0).sqrt())
}

/// A scattering function at one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScatteringFunction {
    Lambertian(Lambertian),
    HemisphericalEmission(HemisphericalEmission),
    SpecularReflection(SpecularReflection),
    SpecularTransmission(SpecularTransmission),
    PerfectGlass(PerfectGlass),
    PerfectAbsorber,
}

impl ScatteringFunction {
    /// Bidirectional value `f(wo, wi)`; black for delta variants.
    pub fn evaluate(&self, wo: Vec3, wi: Vec3) -> Color {
        match self {
            ScatteringFunction::Lambertian(f) => f.evaluate(wo, wi),
            ScatteringFunction::HemisphericalEmission(f) => f.evaluate(wo, wi),
            ScatteringFunction::SpecularReflection(f) => f.evaluate(wo, wi),
            ScatteringFunction::SpecularTransmission(f) => f.evaluate(wo, wi),
            ScatteringFunction::PerfectGlass(f) => f.evaluate(wo, wi),
            ScatteringFunction::PerfectAbsorber => BLACK,
        }
    }

    /// Radiance emitted towards `wo`.
    pub fn emitted(&self, wo: Vec3) -> Color {
        match self {
            ScatteringFunction::Lambertian(f) => f.emitted(wo),
            ScatteringFunction::HemisphericalEmission(f) => f.emitted(wo),
            ScatteringFunction::SpecularReflection(f) => f.emitted(wo),
            ScatteringFunction::SpecularTransmission(f) => f.emitted(wo),
            ScatteringFunction::PerfectGlass(f) => f.emitted(wo),
            ScatteringFunction::PerfectAbsorber => BLACK,
        }
    }

    /// Whether sampling only ever produces delta samples.
    pub fn is_delta(&self) -> bool {
        matches!(
            self,
            ScatteringFunction::SpecularReflection(_)
                | ScatteringFunction::SpecularTransmission(_)
                | ScatteringFunction::PerfectGlass(_)
        )
    }

    /// Sample an incident direction for outgoing direction `wo`.
    ///
    /// Continuous variants draw a cosine-weighted direction on `wo`'s side
    /// of the surface.
    pub fn sample_direction(&self, u0: f32, u1: f32, wo: Vec3) -> ScatteringSample {
        match self {
            ScatteringFunction::SpecularReflection(f) => f.sample(wo),
            ScatteringFunction::SpecularTransmission(f) => f.sample(wo),
            ScatteringFunction::PerfectGlass(f) => f.sample(u0, wo),
            ScatteringFunction::Lambertian(_)
            | ScatteringFunction::HemisphericalEmission(_)
            | ScatteringFunction::PerfectAbsorber => {
                let mut wi = cosine_hemisphere(u0, u1);
                if wo.z < 0.0 {
                    wi.z = -wi.z;
                }
                let pdf = wi.z.abs() * FRAC_1_PI;
                ScatteringSample::continuous(wi, self.evaluate(wo, wi), pdf)
            }
        }
    }
}

impl From<Lambertian> for ScatteringFunction {
    fn from(f: Lambertian) -> Self {
        ScatteringFunction::Lambertian(f)
    }
}

impl From<HemisphericalEmission> for ScatteringFunction {
    fn from(f: HemisphericalEmission) -> Self {
        ScatteringFunction::HemisphericalEmission(f)
    }
}

impl From<SpecularReflection> for ScatteringFunction {
    fn from(f: SpecularReflection) -> Self {
        ScatteringFunction::SpecularReflection(f)
    }
}

impl From<SpecularTransmission> for ScatteringFunction {
    fn from(f: SpecularTransmission) -> Self {
        ScatteringFunction::SpecularTransmission(f)
    }
}

impl From<PerfectGlass> for ScatteringFunction {
    fn from(f: PerfectGlass) -> Self {
        ScatteringFunction::PerfectGlass(f)
    }
}
