//! The scene: a flat list of surfaces with their materials.

use crate::{Intersection, Material, Surface};
use glint_math::{Aabb, Ray};
use std::sync::Arc;

/// A surface bound to a material.
///
/// The primitive owns its surface; materials are shared between primitives.
#[derive(Debug, Clone)]
pub struct SurfacePrimitive {
    surface: Surface,
    material: Arc<Material>,
}

impl SurfacePrimitive {
    pub fn new(surface: impl Into<Surface>, material: Arc<Material>) -> Self {
        Self {
            surface: surface.into(),
            material,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

/// A hit on a scene primitive.
#[derive(Debug, Clone, Copy)]
pub struct SceneIntersection<'a> {
    pub intersection: Intersection,
    pub primitive: &'a SurfacePrimitive,
}

/// Immutable collection of primitives queried by the renderer.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<SurfacePrimitive>,
}

impl Scene {
    pub fn new(primitives: Vec<SurfacePrimitive>) -> Self {
        Self { primitives }
    }

    pub fn primitives(&self) -> &[SurfacePrimitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Nearest hit over all primitives.
    ///
    /// Each hit shrinks the ray so later primitives must be strictly closer;
    /// on equal distances the earlier primitive wins.
    pub fn intersect(&self, ray: &Ray) -> Option<SceneIntersection<'_>> {
        let mut ray = *ray;
        let mut closest = None;

        for primitive in &self.primitives {
            if let Some(intersection) = primitive.surface.intersect(&ray) {
                ray.end(intersection.ray_parameter());
                closest = Some(SceneIntersection {
                    intersection,
                    primitive,
                });
            }
        }

        closest
    }

    /// Whether anything is hit; stops at the first hit.
    pub fn is_intersected(&self, ray: &Ray) -> bool {
        self.primitives.iter().any(|p| p.surface.is_intersected(ray))
    }

    /// Primitives whose material emits light.
    pub fn emitters(&self) -> impl Iterator<Item = &SurfacePrimitive> + '_ {
        self.primitives.iter().filter(|p| p.material.is_emitter())
    }

    pub fn bounding_box(&self) -> Aabb {
        self.primitives
            .iter()
            .map(|p| p.surface.bounding_box())
            .reduce(|a, b| Aabb::surrounding(&a, &b))
            .unwrap_or(Aabb::EMPTY)
    }
}

impl FromIterator<SurfacePrimitive> for Scene {
    fn from_iter<I: IntoIterator<Item = SurfacePrimitive>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
