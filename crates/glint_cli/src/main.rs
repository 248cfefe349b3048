use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glint_renderer::{ImageBuffer, Integrator, PathTracer, RenderConfig, RenderProgress};
use glint_scene::{load_scene_file, presets, LoadedScene};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_SIZE: u32 = 512;
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IntegratorArg {
    /// Multi-bounce path tracing
    Path,
    /// Emission and direct light only
    Direct,
}

impl From<IntegratorArg> for Integrator {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Path => Integrator::PathTracing,
            IntegratorArg::Direct => Integrator::DirectLighting,
        }
    }
}

/// Render a scene to an image with the Glint path tracer.
#[derive(Parser, Debug)]
#[command(name = "glint", version, about)]
struct Args {
    /// JSON scene file (renders the Cornell box when omitted)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Paths per pixel
    #[arg(long)]
    spp: Option<u32>,

    #[arg(long)]
    max_path_length: Option<u32>,

    /// Light samples per emitter at each path vertex
    #[arg(long)]
    light_samples: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Light transport estimator (defaults to the scene's, else path)
    #[arg(long, value_enum)]
    integrator: Option<IntegratorArg>,

    /// Worker threads (0 = one per core)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
}

fn load(args: &Args) -> Result<LoadedScene> {
    let mut loaded = match &args.scene {
        Some(path) => load_scene_file(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => {
            log::info!("No scene given, rendering the Cornell box");
            presets::cornell_box(DEFAULT_SIZE, DEFAULT_SIZE)
                .context("Failed to build Cornell box")?
        }
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or(loaded.width);
        let height = args.height.unwrap_or(loaded.height);
        loaded.resize(width, height).context("Invalid image size")?;
    }

    Ok(loaded)
}

/// Scene render settings with command-line overrides applied.
fn render_config(args: &Args, loaded: &LoadedScene) -> RenderConfig {
    let mut config = loaded.render_config();
    if let Some(spp) = args.spp {
        config.paths_per_pixel = spp;
    }
    if let Some(max_path_length) = args.max_path_length {
        config.max_path_length = max_path_length;
    }
    if let Some(light_samples) = args.light_samples {
        config.light_samples = light_samples;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(integrator) = args.integrator {
        config.integrator = integrator.into();
    }
    config
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let loaded = load(&args)?;

    let tracer = PathTracer::new(render_config(&args, &loaded));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build render thread pool")?;
    log::info!("Using {} render threads", pool.current_num_threads());

    let mut image = ImageBuffer::new(loaded.width, loaded.height);
    let progress = RenderProgress::new();
    let done = AtomicBool::new(false);
    let start = Instant::now();

    thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                thread::sleep(PROGRESS_INTERVAL);
                if progress.expected_count() > 0 && !progress.is_complete() {
                    log::info!(
                        "{:5.1}% ({}/{} pixels, {:.1?})",
                        progress.fraction() * 100.0,
                        progress.count(),
                        progress.expected_count(),
                        start.elapsed()
                    );
                }
            }
        });

        pool.install(|| tracer.render(&loaded.camera, &loaded.scene, &mut image, &progress));
        done.store(true, Ordering::Relaxed);
    });
    log::info!("Rendered in {:.1?}", start.elapsed());

    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_scene_settings() {
        let loaded = presets::cornell_box(8, 8).unwrap();
        let args = Args::try_parse_from([
            "glint",
            "--integrator",
            "direct",
            "--spp",
            "3",
            "--max-path-length",
            "2",
        ])
        .unwrap();

        let config = render_config(&args, &loaded);
        assert_eq!(config.integrator, Integrator::DirectLighting);
        assert_eq!(config.paths_per_pixel, 3);
        assert_eq!(config.max_path_length, 2);
        assert_eq!(PathTracer::new(config).config().max_path_length, 3);
    }

    #[test]
    fn test_scene_settings_kept_without_flags() {
        let loaded = presets::cornell_box(8, 8).unwrap();
        let args = Args::try_parse_from(["glint"]).unwrap();
        assert_eq!(render_config(&args, &loaded), loaded.render_config());
        assert!(Args::try_parse_from(["glint", "--integrator", "photon"]).is_err());
    }
}
