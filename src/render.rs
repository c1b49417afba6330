//! Rendering engine
//!
//! One worker-pool job per scanline. Rows come back over a channel in
//! completion order and are merged by row index, so the output is identical
//! no matter how the pool schedules them.

use std::num::NonZeroUsize;
use std::sync::{mpsc, Arc};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use threadpool::ThreadPool;

use crate::cameras::Camera;
use crate::objects::{Hittable, World};
use crate::{Color, Ray};

/// Failures of a render invocation
///
/// Absence of intersections and absorbed rays are not errors; the only way a
/// render fails is losing part of the image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A worker died before delivering its scanline
    #[error("render lost {missing} of {expected} scanlines")]
    MissingRows { expected: usize, missing: usize },
}

/// Knobs for a single render invocation
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub image_width: usize,
    pub image_height: usize,
    pub samples_per_pixel: usize,
    pub max_depth: u32,
    /// Base seed for the per-row generators; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Worker count; `None` uses the available hardware parallelism
    pub threads: Option<usize>,
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            seed: None,
            threads: None,
        }
    }
}

/// Accumulated per-pixel sample sums, top scanline first
///
/// Pixels are raw sums over `samples_per_pixel` samples; averaging and gamma
/// correction happen when the image is serialized.
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}
impl Image {
    /// Pixel at `(row, col)` where row 0 is the top scanline
    pub fn pixel(&self, row: usize, col: usize) -> &Color {
        &self.pixels[row * self.width + col]
    }
}

/// Colour seen along a ray
///
/// Recursive and depth-bounded: every bounce multiplies the scattered
/// material attenuation into the result, and rays that survive `depth`
/// bounces contribute nothing.
pub fn ray_color(ray: &Ray, world: &World, depth: u32, rng: &mut impl Rng) -> Color {
    // Exceeded the bounce limit, no more light is gathered
    if depth == 0 {
        return Color::zeros();
    }

    // The 0.001 minimum keeps bounced rays from re-hitting their own surface
    if let Some(hit) = world.try_hit(ray, 0.001, f64::INFINITY) {
        return match hit.material.try_scatter(ray, &hit, rng) {
            Some(sr) => sr
                .attenuation
                .component_mul(&ray_color(&sr.scattered, world, depth - 1, rng)),
            None => Color::zeros(),
        };
    }

    // Sky: blend white and blue by ray height
    let unit_direction = ray.unit_direction();
    let t = 0.5 * (unit_direction[1] + 1.0);
    (1.0 - t) * Color::new(1.0, 1.0, 1.0) + t * Color::new(0.5, 0.7, 1.0)
}

/// Parallel scanline renderer over a read-only scene
pub struct Renderer {
    world: Arc<World>,
    camera: Arc<Camera>,
    settings: RenderSettings,
}
impl Renderer {
    pub fn new(world: World, camera: Camera, settings: RenderSettings) -> Self {
        assert!(
            settings.image_width >= 1 && settings.image_height >= 1,
            "image dimensions must be at least 1x1"
        );
        assert!(
            settings.samples_per_pixel >= 1,
            "need at least one sample per pixel"
        );
        Self {
            world: Arc::new(world),
            camera: Arc::new(camera),
            settings,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(&self) -> Result<Image, RenderError> {
        self.render_with_progress(|_| {})
    }

    /// Render, invoking `progress` on the calling thread once per completed
    /// scanline with the number of rows finished so far
    ///
    /// The callback observes completion order; it has no influence on the
    /// assembled image.
    pub fn render_with_progress<F>(&self, mut progress: F) -> Result<Image, RenderError>
    where
        F: FnMut(usize),
    {
        let RenderSettings {
            image_width: width,
            image_height: height,
            samples_per_pixel,
            max_depth,
            seed,
            threads,
        } = self.settings.clone();

        let workers = threads.unwrap_or_else(default_workers);
        let pool = ThreadPool::new(workers);
        let (tx, rx) = mpsc::channel();

        for j in 0..height {
            let tx = tx.clone();
            let world = Arc::clone(&self.world);
            let camera = Arc::clone(&self.camera);
            pool.execute(move || {
                // Each job owns its generator; rows never share RNG state
                let mut rng = match seed {
                    Some(base) => StdRng::seed_from_u64(base.wrapping_add(j as u64)),
                    None => StdRng::from_entropy(),
                };
                let row = render_row(
                    j,
                    width,
                    height,
                    samples_per_pixel,
                    max_depth,
                    &camera,
                    &world,
                    &mut rng,
                );
                // A send failure means the receiver gave up on the render
                let _ = tx.send((j, row));
            });
        }
        drop(tx);

        let mut rows: Vec<Option<Vec<Color>>> = vec![None; height];
        let mut completed = 0;
        for (j, row) in rx {
            rows[j] = Some(row);
            completed += 1;
            progress(completed);
        }
        pool.join();

        // Merge by row index, top scanline first
        let mut pixels = Vec::with_capacity(width * height);
        let mut missing = 0;
        for row in rows.into_iter().rev() {
            match row {
                Some(mut r) => pixels.append(&mut r),
                None => missing += 1,
            }
        }
        if missing > 0 {
            return Err(RenderError::MissingRows {
                expected: height,
                missing,
            });
        }
        Ok(Image {
            width,
            height,
            pixels,
        })
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Accumulate `samples_per_pixel` jittered samples for every pixel of row `j`
#[allow(clippy::too_many_arguments)]
fn render_row(
    j: usize,
    width: usize,
    height: usize,
    samples_per_pixel: usize,
    max_depth: u32,
    camera: &Camera,
    world: &World,
    rng: &mut impl Rng,
) -> Vec<Color> {
    // max(1) keeps single-pixel-wide or -tall images from dividing by zero
    let u_scale = (width - 1).max(1) as f64;
    let v_scale = (height - 1).max(1) as f64;

    (0..width)
        .map(|i| {
            let mut color = Color::zeros();
            for _ in 0..samples_per_pixel {
                let u = (i as f64 + rng.gen::<f64>()) / u_scale;
                let v = (j as f64 + rng.gen::<f64>()) / v_scale;
                let ray = camera.get_ray(u, v, rng);
                color += ray_color(&ray, world, max_depth, rng);
            }
            color
        })
        .collect()
}
