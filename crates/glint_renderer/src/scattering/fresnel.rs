//! Fresnel reflectance models.

use super::{Color, WHITE};

/// Approximate a conductor's absorption coefficient from its reflectance
/// color: `k = 2 * sqrt(saturate(R / (1 - R)))`.
pub fn approximate_absorption(reflectance: Color) -> Color {
    let ratio = reflectance / (Color::ONE - reflectance);
    // Saturate before the square root; R == 1 gives inf and clamps to 1
    let saturated = ratio.clamp(Color::ZERO, Color::ONE);
    2.0 * Color::new(saturated.x.sqrt(), saturated.y.sqrt(), saturated.z.sqrt())
}

/// Fresnel reflectance as a function of the cosine between the direction
/// and the surface normal.
///
/// Selected once by the owning scattering function at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fresnel {
    /// Everything is reflected.
    NoOp,
    /// Metal with complex index of refraction `eta + i k`.
    Conductor { eta: Color, k: Color },
    /// Interface between two dielectrics; `eta_i` on the normal's side.
    Dielectric { eta_i: f32, eta_t: f32 },
}

impl Fresnel {
    pub fn conductor(eta: Color, k: Color) -> Self {
        Fresnel::Conductor { eta, k }
    }

    /// Conductor whose absorption is approximated from `reflectance`.
    pub fn approximate_conductor(reflectance: Color, eta: f32) -> Self {
        Fresnel::Conductor {
            eta: Color::splat(eta),
            k: approximate_absorption(reflectance),
        }
    }

    pub fn dielectric(eta_i: f32, eta_t: f32) -> Self {
        Fresnel::Dielectric { eta_i, eta_t }
    }

    /// Reflectance for a direction at `cos_theta` to the normal.
    pub fn evaluate(&self, cos_theta: f32) -> Color {
        match *self {
            Fresnel::NoOp => WHITE,
            Fresnel::Conductor { eta, k } => conductor(cos_theta.abs(), eta, k),
            Fresnel::Dielectric { eta_i, eta_t } => {
                Color::splat(dielectric(cos_theta, eta_i, eta_t))
            }
        }
    }
}

fn conductor(cos_i: f32, eta: Color, k: Color) -> Color {
    let cos2 = Color::splat(cos_i * cos_i);
    let two_eta_cos = 2.0 * eta * cos_i;
    let eta_k = eta * eta + k * k;

    let tmp = cos2 * eta_k;
    let r_parallel2 = (tmp - two_eta_cos + Color::ONE) / (tmp + two_eta_cos + Color::ONE);
    let r_perpendicular2 = (eta_k - two_eta_cos + cos2) / (eta_k + two_eta_cos + cos2);

    (r_parallel2 + r_perpendicular2) / 2.0
}

fn dielectric(cos_i: f32, eta_i: f32, eta_t: f32) -> f32 {
    let cos_i = cos_i.clamp(-1.0, 1.0);

    // Coming from the far side swaps the media
    let (eta_i, eta_t) = if cos_i > 0.0 { (eta_i, eta_t) } else { (eta_t, eta_i) };

    let sin_t = eta_i / eta_t * (1.0 - cos_i * cos_i).max(0.0).sqrt();
    if sin_t >= 1.0 {
        // Total internal reflection
        return 1.0;
    }

    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    let cos_i = cos_i.abs();

    let r_parallel = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perpendicular = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);

    (r_parallel * r_parallel + r_perpendicular * r_perpendicular) / 2.0
}
