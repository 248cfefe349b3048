//! Square tiles of the image, traced independently.
//!
//! Each bucket owns a disjoint pixel rectangle and its own random stream,
//! so workers never share mutable state.

use crate::{Camera, Color, ImageBuffer, PathTracer, RenderProgress, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Edge length used when a configuration asks for zero.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Pixel rectangle `[x, x + width) x [y, y + height)` with its position in
/// the render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// Left pixel column
    pub x: u32,
    /// Top pixel row
    pub y: u32,
    /// Columns covered; edge buckets may be narrower than the bucket size
    pub width: u32,
    /// Rows covered; edge buckets may be shorter than the bucket size
    pub height: u32,
    /// Position in the centre-out render order, also used to seed the
    /// bucket's sampler
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed of this bucket's random stream.
    pub fn seed(&self, base: u64) -> u64 {
        base ^ (self.index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn distance_squared_to(&self, cx: f32, cy: f32) -> f32 {
        let dx = self.x as f32 + self.width as f32 * 0.5 - cx;
        let dy = self.y as f32 + self.height as f32 * 0.5 - cy;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` image, nearest-to-centre first.
///
/// Edge buckets are clipped to the image. `index` follows the returned
/// order.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1) as usize;

    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size)
        .flat_map(|y| {
            (0..width).step_by(size).map(move |x| {
                let size = size as u32;
                Bucket::new(x, y, size.min(width - x), size.min(height - y), 0)
            })
        })
        .collect();

    let (cx, cy) = (width as f32 * 0.5, height as f32 * 0.5);
    buckets.sort_by(|a, b| a.distance_squared_to(cx, cy).total_cmp(&b.distance_squared_to(cx, cy)));

    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Render a single bucket.
///
/// Returns `None` as soon as the progress reports cancellation; the flag is
/// checked before every pixel.
pub fn render_bucket(
    tracer: &PathTracer,
    bucket: &Bucket,
    camera: &Camera,
    scene: &Scene,
    image_size: (u32, u32),
    progress: &RenderProgress,
) -> Option<BucketResult> {
    let mut rng = StdRng::seed_from_u64(bucket.seed(tracer.config().seed));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            if progress.is_cancelled() {
                return None;
            }

            let color = tracer.render_pixel(
                camera,
                scene,
                bucket.x + local_x,
                bucket.y + local_y,
                image_size,
                &mut rng,
            );
            pixels.push(color);
            progress.increment();
        }
    }

    log::trace!("Bucket {} done", bucket.index);
    Some(BucketResult::new(*bucket, pixels))
}

/// Finished pixels of one bucket, row-major.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their place in `image`.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (i, &color) in self.pixels.iter().enumerate() {
            let x = self.bucket.x + (i % width) as u32;
            let y = self.bucket.y + (i / width) as u32;
            image.set(x, y, color);
        }
    }
}
