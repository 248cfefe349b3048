//! Perspective camera for primary ray generation.

use glint_math::{Mat4, Ray, Vec3};

/// A pinhole camera placed by a camera-to-world transform.
///
/// The camera looks down its local `-z` axis with `+y` up and `+x` to the
/// right. The image plane sits at the distance where it spans exactly one
/// unit vertically, so image coordinates map to the plane without further
/// scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    look: Vec3,
    near: f32,
    aspect: f32,
    fov_y_degrees: f32,
}

impl Camera {
    /// Create a camera from its camera-to-world matrix, vertical field of
    /// view in degrees and width/height aspect ratio.
    pub fn new(camera_to_world: Mat4, fov_y_degrees: f32, aspect: f32) -> Self {
        let near = 0.5 / (fov_y_degrees.to_radians() / 2.0).tan();

        Self {
            eye: camera_to_world.transform_point3(Vec3::ZERO),
            right: camera_to_world.transform_vector3(Vec3::X).normalize_or(Vec3::X),
            up: camera_to_world.transform_vector3(Vec3::Y).normalize_or(Vec3::Y),
            look: camera_to_world.transform_vector3(Vec3::NEG_Z).normalize_or(Vec3::NEG_Z),
            near,
            aspect,
            fov_y_degrees,
        }
    }

    /// Camera at `eye` looking towards `center`.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self::new(look_at_matrix(eye, center, up), fov_y_degrees, aspect)
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    /// The same camera with a different image aspect ratio.
    pub fn with_aspect(self, aspect: f32) -> Self {
        Self { aspect, ..self }
    }

    /// Ray through image coordinates `(u, v)`, both in `[0, 1]` with
    /// `(0, 0)` at the top-left corner.
    pub fn generate_ray(&self, u: f32, v: f32) -> Ray {
        let direction =
            self.near * self.look + (u - 0.5) * self.aspect * self.right + (0.5 - v) * self.up;
        Ray::new(self.eye, direction.normalize())
    }
}

/// Camera-to-world matrix for a camera at `eye` looking at `center`.
pub fn look_at_matrix(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, center, up).inverse()
}
