//! Core path tracing renderer.
//!
//! Unidirectional path tracing with next-event estimation:
//! - every non-delta vertex samples each emitter explicitly
//! - emission found by a hit only counts after camera or delta bounces
//! - paths end after a fixed number of vertices (no Russian roulette)
//!
//! [`Integrator::DirectLighting`] stops at the first hit instead, adding
//! its emission and the explicitly sampled light from every emitter.

use crate::bucket::{generate_buckets, render_bucket, DEFAULT_BUCKET_SIZE};
use crate::scattering::{ScatteringFunction, BLACK, WHITE};
use crate::{Camera, Color, DifferentialGeometry, ImageBuffer, RenderProgress, Scene};
use glint_math::{Ray, Vec3};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Light transport estimator used per camera ray.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Multi-bounce paths with next-event estimation
    #[default]
    PathTracing,
    /// Emission plus direct light at the first hit; no indirect light
    DirectLighting,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub integrator: Integrator,
    /// Independent path samples averaged per pixel
    pub paths_per_pixel: u32,
    /// Path vertices run `2..max_path_length`; anything below 3 is raised
    /// to 3 so the camera ray always reaches a surface
    pub max_path_length: u32,
    /// Light samples per emitter at every vertex
    pub light_samples: u32,
    /// Base seed for the per-bucket random streams
    pub seed: u64,
    /// Jitter camera samples within the pixel instead of using its center
    pub jitter: bool,
    /// Edge length of the square buckets scheduled in parallel
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            integrator: Integrator::PathTracing,
            paths_per_pixel: 20,
            max_path_length: 5,
            light_samples: 1,
            seed: 0,
            jitter: true,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

/// How a render pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Completed,
    /// Stopped through [`RenderProgress::cancel`]; unfinished buckets
    /// stay black.
    Cancelled,
}

/// A path tracer with a validated configuration.
#[derive(Debug, Clone, Default)]
pub struct PathTracer {
    config: RenderConfig,
}

impl PathTracer {
    /// Create a tracer, correcting out-of-range settings with a warning.
    pub fn new(mut config: RenderConfig) -> Self {
        if config.max_path_length < 3 {
            log::warn!(
                "max_path_length {} is too short to reach any surface; using 3",
                config.max_path_length
            );
            config.max_path_length = 3;
        }
        if config.paths_per_pixel == 0 {
            log::warn!("paths_per_pixel is 0; using 1");
            config.paths_per_pixel = 1;
        }
        if config.light_samples == 0 {
            log::warn!("light_samples is 0; using 1");
            config.light_samples = 1;
        }
        if config.bucket_size == 0 {
            log::warn!("bucket_size is 0; using {}", DEFAULT_BUCKET_SIZE);
            config.bucket_size = DEFAULT_BUCKET_SIZE;
        }

        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render `scene` into `image`.
    ///
    /// The image is cleared to black and `progress` is reset to the pixel
    /// count, then buckets are traced in parallel. Every pixel is written
    /// exactly once unless the render is cancelled.
    pub fn render(
        &self,
        camera: &Camera,
        scene: &Scene,
        image: &mut ImageBuffer,
        progress: &RenderProgress,
    ) -> RenderOutcome {
        let (width, height) = (image.width(), image.height());
        image.fill(BLACK);
        progress.reset(width as u64 * height as u64);

        let buckets = generate_buckets(width, height, self.config.bucket_size);
        log::info!(
            "Rendering {}x{} ({:?}) with {} paths per pixel, {} buckets, {} primitives \
             ({} emitters)",
            width,
            height,
            self.config.integrator,
            self.config.paths_per_pixel,
            buckets.len(),
            scene.len(),
            scene.emitters().count()
        );
        let start = Instant::now();

        let results: Vec<_> = buckets
            .par_iter()
            .map(|bucket| render_bucket(self, bucket, camera, scene, (width, height), progress))
            .collect();

        for result in results.iter().flatten() {
            result.write_into(image);
        }

        if progress.is_cancelled() {
            log::info!("Render cancelled after {:.2?}", start.elapsed());
            RenderOutcome::Cancelled
        } else {
            log::info!("Render finished in {:.2?}", start.elapsed());
            RenderOutcome::Completed
        }
    }

    /// Average of `paths_per_pixel` path estimates through pixel `(x, y)`.
    pub fn render_pixel<R: Rng>(
        &self,
        camera: &Camera,
        scene: &Scene,
        x: u32,
        y: u32,
        (width, height): (u32, u32),
        rng: &mut R,
    ) -> Color {
        let mut result = BLACK;

        for _ in 0..self.config.paths_per_pixel {
            let (dx, dy) = if self.config.jitter {
                (rng.gen::<f32>(), rng.gen::<f32>())
            } else {
                (0.5, 0.5)
            };
            let u = (x as f32 + dx) / width as f32;
            let v = (y as f32 + dy) / height as f32;

            result += self.radiance(camera.generate_ray(u, v), scene, rng);
        }

        result / self.config.paths_per_pixel as f32
    }

    /// One radiance estimate along `ray` with the configured integrator.
    pub fn radiance<R: Rng>(&self, ray: Ray, scene: &Scene, rng: &mut R) -> Color {
        match self.config.integrator {
            Integrator::PathTracing => self.trace_path(ray, scene, rng),
            Integrator::DirectLighting => self.trace_direct(ray, scene, rng),
        }
    }

    /// Emission at the first hit plus light arriving there straight from
    /// the emitters.
    pub fn trace_direct<R: Rng>(&self, ray: Ray, scene: &Scene, rng: &mut R) -> Color {
        let Some(hit) = scene.intersect(&ray) else {
            return BLACK;
        };

        let dg = hit.intersection.differential_geometry();
        let material = hit.primitive.material();
        let wo = dg.localize(-ray.direction().normalize_or_zero());

        let mut radiance = material.evaluate_emission(dg).emitted(wo);
        let f = material.evaluate_scattering(dg);
        if f != ScatteringFunction::PerfectAbsorber && !f.is_delta() {
            radiance += self.direct_lighting(scene, dg, &f, wo, rng);
        }
        radiance
    }

    /// Radiance arriving along `ray` estimated with a single path.
    pub fn trace_path<R: Rng>(&self, mut ray: Ray, scene: &Scene, rng: &mut R) -> Color {
        let mut throughput = WHITE;
        let mut radiance = BLACK;
        // The camera ray counts as a delta sample so visible lights show up
        let mut is_delta = true;

        for _bounce in 2..self.config.max_path_length {
            let Some(hit) = scene.intersect(&ray) else {
                break;
            };

            let dg = hit.intersection.differential_geometry();
            let material = hit.primitive.material();
            let wo = dg.localize(-ray.direction().normalize_or_zero());

            // Lights reached through diffuse bounces are covered by
            // next-event estimation
            if is_delta {
                radiance += throughput * material.evaluate_emission(dg).emitted(wo);
            }

            let f = material.evaluate_scattering(dg);
            if f == ScatteringFunction::PerfectAbsorber {
                break;
            }

            if !f.is_delta() {
                radiance += throughput * self.direct_lighting(scene, dg, &f, wo, rng);
            }

            let sample = f.sample_direction(rng.gen(), rng.gen(), wo);
            if sample.is_delta {
                throughput *= sample.throughput;
            } else {
                if sample.pdf <= 0.0 {
                    break;
                }
                throughput *= sample.throughput * dg.abs_cos_theta(sample.wi) / sample.pdf;
            }

            if throughput.max_element() <= 0.0 || !throughput.is_finite() {
                break;
            }

            ray = Ray::new(dg.point(), dg.globalize(sample.wi));
            is_delta = sample.is_delta;
        }

        radiance
    }

    /// Light reflected towards `wo` from all emitters, one shadow ray per
    /// light sample.
    ///
    /// Occluded samples contribute exactly zero. `wo` is in `dg`'s local
    /// frame.
    pub fn direct_lighting<R: Rng>(
        &self,
        scene: &Scene,
        dg: &DifferentialGeometry,
        f: &ScatteringFunction,
        wo: Vec3,
        rng: &mut R,
    ) -> Color {
        let samples = self.config.light_samples.max(1);
        let weight = 1.0 / samples as f32;
        let mut result = BLACK;

        for emitter in scene.emitters() {
            let surface = emitter.surface();

            for _ in 0..samples {
                let light = surface.sample_surface(rng.gen(), rng.gen());
                let pdf = surface.pdf(&light);
                if pdf <= 0.0 {
                    continue;
                }

                let to_light = light.point() - dg.point();
                let distance_squared = to_light.length_squared();
                if distance_squared <= 0.0 {
                    continue;
                }
                let wi_world = to_light / distance_squared.sqrt();

                let wi = dg.localize(wi_world);
                // Reflection only: light behind the surface does not count
                if wi.z * wo.z <= 0.0 {
                    continue;
                }

                let we = light.localize(-wi_world);
                let emission = emitter.material().evaluate_emission(&light).emitted(we);
                if emission.max_element() <= 0.0 {
                    continue;
                }

                if scene.is_intersected(&Ray::between(dg.point(), light.point())) {
                    continue;
                }

                let geometry = dg.abs_cos_theta(wi) * light.abs_cos_theta(we) / distance_squared;
                result += f.evaluate(wo, wi) * geometry * emission * (weight / pdf);
            }
        }

        result
    }
}

/// Render with the default configuration.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    image: &mut ImageBuffer,
    progress: &RenderProgress,
) -> RenderOutcome {
    PathTracer::default().render(camera, scene, image, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Mesh, Sphere, SurfacePrimitive, TriangleMesh};
    use glint_math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// A 1x1 light square at height `y` facing down.
    fn ceiling_light(y: f32, radiosity: f32) -> SurfacePrimitive {
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(-0.5, y, -0.5),
                Vec3::new(0.5, y, -0.5),
                Vec3::new(0.5, y, 0.5),
                Vec3::new(-0.5, y, 0.5),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        SurfacePrimitive::new(Mesh::new(mesh), Arc::new(Material::light(Color::splat(radiosity))))
    }

    fn floor_dg() -> DifferentialGeometry {
        DifferentialGeometry::new(Vec3::ZERO, Vec2::ZERO, Vec3::X, Vec3::NEG_Z, Vec3::Y)
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.paths_per_pixel, 20);
        assert_eq!(config.max_path_length, 5);
        assert_eq!(config.light_samples, 1);
        assert_eq!(config.integrator, Integrator::PathTracing);
        assert!(config.jitter);
    }

    #[test]
    fn test_short_paths_are_clamped() {
        let tracer = PathTracer::new(RenderConfig {
            max_path_length: 1,
            paths_per_pixel: 0,
            bucket_size: 0,
            ..RenderConfig::default()
        });

        assert_eq!(tracer.config().max_path_length, 3);
        assert_eq!(tracer.config().paths_per_pixel, 1);
        assert_eq!(tracer.config().bucket_size, DEFAULT_BUCKET_SIZE);

        // Two vertices would leave the bounce loop empty
        let tracer = PathTracer::new(RenderConfig {
            max_path_length: 2,
            ..RenderConfig::default()
        });
        assert_eq!(tracer.config().max_path_length, 3);

        let scene = Scene::new(vec![ceiling_light(2.0, 10.0)]);
        let mut rng = StdRng::seed_from_u64(5);
        let radiance = tracer.trace_path(Ray::new(Vec3::ZERO, Vec3::Y), &scene, &mut rng);
        assert!((radiance - Color::splat(10.0 / std::f32::consts::PI)).length() < 1e-4);
    }

    #[test]
    fn test_config_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "paths_per_pixel": 4, "seed": 9 }"#).unwrap();
        assert_eq!(config.paths_per_pixel, 4);
        assert_eq!(config.seed, 9);
        assert_eq!(config.max_path_length, 5);

        let config: RenderConfig =
            serde_json::from_str(r#"{ "integrator": "direct_lighting" }"#).unwrap();
        assert_eq!(config.integrator, Integrator::DirectLighting);
        assert!(serde_json::from_str::<RenderConfig>(r#"{ "integrator": "photon" }"#).is_err());
    }

    #[test]
    fn test_miss_is_black() {
        let scene = Scene::new(vec![ceiling_light(2.0, 10.0)]);
        let tracer = PathTracer::default();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        assert_eq!(tracer.trace_path(ray, &scene, &mut rng), BLACK);
    }

    #[test]
    fn test_light_seen_directly() {
        let scene = Scene::new(vec![ceiling_light(2.0, 10.0)]);
        let tracer = PathTracer::default();
        let mut rng = StdRng::seed_from_u64(0);

        // The light faces down, so looking up sees radiosity / π
        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let radiance = tracer.trace_path(up, &scene, &mut rng);
        assert!((radiance - Color::splat(10.0 / std::f32::consts::PI)).length() < 1e-4);

        // Its back side is black
        let down = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::NEG_Y);
        assert_eq!(tracer.trace_path(down, &scene, &mut rng), BLACK);
    }

    #[test]
    fn test_direct_lighting_matches_small_light_estimate() {
        // A light far away behaves like a point source:
        // E ≈ L * A * cos / d², reflected = albedo / π * E
        let height = 20.0;
        let radiosity = 400.0;
        let scene = Scene::new(vec![ceiling_light(height, radiosity)]);
        let tracer = PathTracer::new(RenderConfig {
            light_samples: 16,
            ..RenderConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(1);

        let albedo = 0.5;
        let f = Material::matte(Color::splat(albedo)).evaluate_scattering(&floor_dg());
        let wo = Vec3::Z;
        let result = tracer.direct_lighting(&scene, &floor_dg(), &f, wo, &mut rng);

        let radiance = radiosity / std::f32::consts::PI;
        let expected = albedo / std::f32::consts::PI * radiance / (height * height);
        assert!((result.x - expected).abs() < expected * 0.01, "{} vs {}", result.x, expected);
    }

    #[test]
    fn test_occluded_light_gives_zero() {
        let blocker = SurfacePrimitive::new(
            Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.6),
            Arc::new(Material::Default),
        );
        let scene = Scene::new(vec![ceiling_light(2.0, 10.0), blocker]);
        let tracer = PathTracer::new(RenderConfig {
            light_samples: 8,
            ..RenderConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(2);

        let f = Material::matte(Color::ONE).evaluate_scattering(&floor_dg());
        for _ in 0..100 {
            let result = tracer.direct_lighting(&scene, &floor_dg(), &f, Vec3::Z, &mut rng);
            assert_eq!(result, BLACK);
        }
    }

    #[test]
    fn test_direct_integrator_sees_light_and_lit_floor() {
        let floor = SurfacePrimitive::new(
            Mesh::new(
                TriangleMesh::new(
                    vec![
                        Vec3::new(-5.0, 0.0, -5.0),
                        Vec3::new(5.0, 0.0, -5.0),
                        Vec3::new(5.0, 0.0, 5.0),
                        Vec3::new(-5.0, 0.0, 5.0),
                    ],
                    vec![[0, 2, 1], [0, 3, 2]],
                )
                .unwrap(),
            ),
            Arc::new(Material::matte(Color::splat(0.5))),
        );
        let scene = Scene::new(vec![ceiling_light(2.0, 10.0), floor]);
        let tracer = PathTracer::new(RenderConfig {
            integrator: Integrator::DirectLighting,
            ..RenderConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(6);

        let up = tracer.radiance(Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y), &scene, &mut rng);
        assert!((up - Color::splat(10.0 / std::f32::consts::PI)).length() < 1e-4);

        let down = Ray::new(Vec3::new(0.1, 1.0, -0.3), Vec3::NEG_Y);
        assert!(tracer.radiance(down, &scene, &mut rng).x > 0.0);
        assert_eq!(tracer.radiance(Ray::new(Vec3::Y, Vec3::X), &scene, &mut rng), BLACK);
    }

    #[test]
    fn test_light_behind_surface_ignored() {
        let scene = Scene::new(vec![ceiling_light(-2.0, 10.0)]);
        let tracer = PathTracer::default();
        let mut rng = StdRng::seed_from_u64(3);

        let f = Material::Default.evaluate_scattering(&floor_dg());
        assert_eq!(tracer.direct_lighting(&scene, &floor_dg(), &f, Vec3::Z, &mut rng), BLACK);
    }

    #[test]
    fn test_render_fills_image_and_progress() {
        let scene = Scene::new(vec![
            ceiling_light(2.0, 10.0),
            SurfacePrimitive::new(
                Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0),
                Arc::new(Material::Default),
            ),
        ]);
        let camera = Camera::look_at(
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::Y,
            45.0,
            1.0,
        );
        let tracer = PathTracer::new(RenderConfig {
            paths_per_pixel: 2,
            bucket_size: 4,
            ..RenderConfig::default()
        });

        let mut image = ImageBuffer::new(10, 10);
        image.fill(Color::splat(7.0));
        let progress = RenderProgress::new();

        assert_eq!(tracer.render(&camera, &scene, &mut image, &progress), RenderOutcome::Completed);
        assert_eq!(progress.count(), 100);
        assert!(progress.is_complete());
        assert!(image.pixels().iter().all(|c| c.is_finite() && c.min_element() >= 0.0));
        assert!(image.pixels().iter().all(|&c| c != Color::splat(7.0)));

        // The sphere's top is lit, the corner sees nothing
        assert!(image.get(5, 4).max_element() > 0.0);
        assert_eq!(image.get(0, 9), BLACK);
    }

    #[test]
    fn test_cancelled_render_stays_black() {
        let scene = Scene::new(vec![ceiling_light(2.0, 10.0)]);
        let camera = Camera::look_at(Vec3::ZERO, Vec3::Y, Vec3::Z, 45.0, 1.0);
        let mut image = ImageBuffer::new(8, 8);
        let progress = RenderProgress::new();
        progress.cancel();

        let outcome = PathTracer::default().render(&camera, &scene, &mut image, &progress);
        assert_eq!(outcome, RenderOutcome::Cancelled);
        assert_eq!(progress.count(), 0);
        assert!(image.pixels().iter().all(|&c| c == BLACK));
    }
}
