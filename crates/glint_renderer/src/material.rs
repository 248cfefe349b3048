//! Materials bound to scene surfaces.

use crate::scattering::{
    Fresnel, HemisphericalEmission, Lambertian, PerfectGlass, ScatteringFunction,
    SpecularReflection,
};
use crate::{Color, DifferentialGeometry};

/// Index of refraction used for mirrors when none is given.
pub const DEFAULT_MIRROR_ETA: f32 = 2.485;

/// Index of refraction used for glass when none is given.
pub const DEFAULT_GLASS_ETA: f32 = 1.5;

/// A surface material.
///
/// Materials are immutable and shared between primitives. They hand out the
/// scattering and emission functions at a point; both are currently
/// constant over the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Diffuse reflector.
    Matte(Lambertian),
    /// Polished metal.
    Mirror(SpecularReflection),
    /// Smooth dielectric, outside index 1.
    Glass(PerfectGlass),
    /// Diffuse area light. Absorbs everything it receives.
    Light(HemisphericalEmission),
    /// White diffuse reflector.
    Default,
}

impl Material {
    pub fn matte(albedo: Color) -> Self {
        Material::Matte(Lambertian::new(albedo))
    }

    pub fn mirror(reflectance: Color, eta: f32) -> Self {
        Material::Mirror(SpecularReflection::new(
            reflectance,
            Fresnel::approximate_conductor(reflectance, eta),
        ))
    }

    pub fn glass(reflectance: Color, transmittance: Color, eta: f32) -> Self {
        Material::Glass(PerfectGlass::new(reflectance, transmittance, 1.0, eta))
    }

    /// Area light emitting `radiosity` (power per area) from its front side.
    pub fn light(radiosity: Color) -> Self {
        Material::Light(HemisphericalEmission::from_radiosity(radiosity))
    }

    /// Registry name of this material's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Material::Matte(_) => "matte",
            Material::Mirror(_) => "mirror",
            Material::Glass(_) => "glass",
            Material::Light(_) => "light",
            Material::Default => "default",
        }
    }

    pub fn is_emitter(&self) -> bool {
        matches!(self, Material::Light(_))
    }

    /// No material acts as a camera sensor.
    pub fn is_sensor(&self) -> bool {
        false
    }

    pub fn evaluate_scattering(&self, _dg: &DifferentialGeometry) -> ScatteringFunction {
        match *self {
            Material::Matte(f) => f.into(),
            Material::Mirror(f) => f.into(),
            Material::Glass(f) => f.into(),
            Material::Light(_) => ScatteringFunction::PerfectAbsorber,
            Material::Default => Lambertian::default().into(),
        }
    }

    pub fn evaluate_emission(&self, _dg: &DifferentialGeometry) -> ScatteringFunction {
        match *self {
            Material::Light(f) => f.into(),
            _ => ScatteringFunction::PerfectAbsorber,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Default
    }
}
