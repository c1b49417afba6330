//! Command line front end for the path tracer

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use path_tracer::cameras::{Camera, CameraConfig};
use path_tracer::materials::Material;
use path_tracer::objects::{Sphere, World, WorldConfig};
use path_tracer::ppm;
use path_tracer::render::{RenderSettings, Renderer};
use path_tracer::{Color, Point, Vec3};

/// Render a sphere scene to a PPM or PNG image
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Scene description YAML; a built-in demo scene renders when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Output image width in pixels
    #[arg(long, default_value_t = 400)]
    width: usize,

    /// Anti-aliasing samples per pixel
    #[arg(long, default_value_t = 100)]
    samples: usize,

    /// Maximum ray bounce depth
    #[arg(long, default_value_t = 50)]
    max_depth: u32,

    /// Base RNG seed for reproducible renders
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads; defaults to the available parallelism
    #[arg(long)]
    threads: Option<usize>,

    /// Output path; a .png extension selects PNG, anything else PPM text
    #[arg(long, default_value = "render.ppm")]
    output: PathBuf,
}

/// Top-level scene file: camera plus world
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneConfig {
    camera: CameraConfig,
    world: WorldConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (camera, world, aspect_ratio) = match &args.scene {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading scene file {}", path.display()))?;
            let config: SceneConfig = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing scene file {}", path.display()))?;
            let aspect_ratio = config.camera.aspect_ratio;
            (
                Camera::from_config(config.camera),
                World::from_config(config.world),
                aspect_ratio,
            )
        }
        None => {
            log::info!("no scene file given, rendering the built-in demo scene");
            demo_scene(args.seed)
        }
    };

    let image_height = ((args.width as f64 / aspect_ratio).round() as usize).max(1);
    let settings = RenderSettings {
        image_width: args.width,
        image_height,
        samples_per_pixel: args.samples,
        max_depth: args.max_depth,
        seed: args.seed,
        threads: args.threads,
    };

    log::info!(
        "rendering {} spheres at {}x{} with {} samples per pixel",
        world.len(),
        args.width,
        image_height,
        args.samples
    );

    let renderer = Renderer::new(world, camera, settings);
    let bar = ProgressBar::new(image_height as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:60.cyan/blue} {pos}/{len} rows")?
            .progress_chars("█░"),
    );

    // Coarse log heartbeat; clamp so tiny images cannot divide by zero
    let log_every = (image_height / 10).max(1);

    let start = Instant::now();
    let image = renderer.render_with_progress(|done| {
        bar.inc(1);
        if done % log_every == 0 {
            log::debug!("{done}/{image_height} rows complete");
        }
    })?;
    bar.finish();
    log::info!("render finished in {:.2?}", start.elapsed());

    match args.output.extension().and_then(|e| e.to_str()) {
        Some("png") => ppm::save_png(&image, args.samples, &args.output)
            .with_context(|| format!("writing {}", args.output.display()))?,
        _ => {
            let file = File::create(&args.output)
                .with_context(|| format!("creating {}", args.output.display()))?;
            let mut out = BufWriter::new(file);
            ppm::write_ppm(&mut out, &image, args.samples)
                .with_context(|| format!("writing {}", args.output.display()))?;
        }
    }
    log::info!("written image to {}", args.output.display());
    Ok(())
}

/// The classic demo scene: a gray ground sphere, a field of small random
/// spheres, and three large feature spheres
fn demo_scene(seed: Option<u64>) -> (Camera, World, f64) {
    const ASPECT_RATIO: f64 = 16.0 / 9.0;

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut world = World::new();
    world.add(Sphere::new(
        Point::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Material::lambertian(Color::new(0.5, 0.5, 0.5))),
    ));

    for a in -8..8 {
        for b in -8..8 {
            let choose_mat: f64 = rng.gen();
            let center = Point::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );

            // Keep the small spheres clear of the large metal one
            if (center - Point::new(4.0, 0.2, 0.0)).norm() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                Material::lambertian(Color::new(rng.gen(), rng.gen(), rng.gen()))
            } else if choose_mat < 0.95 {
                Material::metal(
                    Color::new(
                        rng.gen_range(0.0..0.5),
                        rng.gen_range(0.0..0.5),
                        rng.gen_range(0.0..0.5),
                    ),
                    rng.gen_range(0.0..0.5),
                )
            } else {
                Material::dielectric(1.5)
            };
            world.add(Sphere::new(center, 0.2, Arc::new(material)));
        }
    }

    world.add(Sphere::new(
        Point::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::lambertian(Color::new(0.1, 0.2, 0.5))),
    ));
    world.add(Sphere::new(
        Point::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Sphere::new(
        Point::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    let look_from = Point::new(13.0, 2.0, 3.0);
    let look_at = Point::zeros();
    let camera = Camera::new(
        look_from,
        look_at,
        Vec3::new(0.0, 1.0, 0.0),
        20.0,
        ASPECT_RATIO,
        0.01,
        (look_from - look_at).norm(),
    );
    (camera, world, ASPECT_RATIO)
}
