//! Headless driver for the Gaussian mixture scatter engine.
//!
//! Loads a scene (JSON or built-in defaults), samples it, and writes the XY/XZ/YZ
//! projections plus the three central density slices as PNG files.

use std::{env, fs, path::PathBuf, time::Instant};

use anyhow::{bail, Context as _, Result};
use scatter_core::{
    bounds::{axis_half_length, scene_center_and_radius},
    evaluate_density_grid, generate_mixture_samples,
    metrics::{checksum, SampleMoments},
    render_projection,
    spd::{randomize_covariances, RandomSpdGenerator},
    Axis, DensityGrid, ProjectionPlane, SceneSettings,
};
use tracer::init_tracing;
use tracing::info;

struct CliOptions {
    config: Option<PathBuf>,
    out_dir: PathBuf,
    seed: Option<String>,
    total: Option<String>,
    point_size: Option<String>,
    randomize_covariance: bool,
    skip_density: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let options = parse_options()?;
    let settings = load_settings(&options)?;

    fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("failed to create {}", options.out_dir.display()))?;

    let started = Instant::now();
    let cloud = generate_mixture_samples(&settings.components, settings.total_samples, settings.seed)
        .context("failed to generate mixture samples")?;
    let (center, radius) = scene_center_and_radius(&cloud.positions);
    let moments = SampleMoments::from_points(cloud.positions.iter().map(|p| p.as_dvec3()));
    info!(
        points = cloud.len(),
        seed = settings.seed,
        ?center,
        radius,
        axis_half_length = axis_half_length(&cloud.positions),
        mean = ?moments.mean,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "generated point cloud"
    );

    let raster = settings.raster_settings();
    for plane in ProjectionPlane::ALL {
        let image = render_projection(&cloud.positions, &cloud.colors, plane, &raster)
            .with_context(|| format!("failed to render {} projection", plane.label()))?;
        let window = plane.view_window(&cloud.positions);
        let path = options.out_dir.join(format!("projection_{}.png", plane.label()));
        image::save_buffer(
            &path,
            image.as_bytes(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            u = ?(window.min_u, window.max_u),
            v = ?(window.min_v, window.max_v),
            view_width = window.width,
            "wrote projection"
        );
    }

    if options.skip_density {
        return Ok(());
    }

    let started = Instant::now();
    let grid = evaluate_density_grid(
        &settings.components,
        settings.density_resolution,
        settings.density_sigma_k,
    )
    .context("failed to evaluate density grid")?;
    info!(
        resolution = grid.resolution(),
        bounds = ?grid.bounds(),
        checksum = checksum(grid.values()),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "evaluated density grid"
    );
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        write_density_slice(&grid, axis, &options.out_dir)?;
    }

    Ok(())
}

fn write_density_slice(grid: &DensityGrid, axis: Axis, out_dir: &std::path::Path) -> Result<()> {
    let res = grid.resolution();
    let values = grid.slice(axis, res / 2);
    // Flip rows so the second remaining axis points up in the image.
    let mut pixels = Vec::with_capacity(values.len());
    for row in values.chunks(res).rev() {
        pixels.extend(row.iter().map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8));
    }
    let label = match axis {
        Axis::X => "x",
        Axis::Y => "y",
        Axis::Z => "z",
    };
    let path = out_dir.join(format!("density_slice_{label}.png"));
    image::save_buffer(&path, &pixels, res as u32, res as u32, image::ColorType::L8)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote density slice");
    Ok(())
}

fn load_settings(options: &CliOptions) -> Result<SceneSettings> {
    let mut settings = match &options.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse scene {}", path.display()))?
        }
        None => SceneSettings::default(),
    };

    if let Some(seed) = &options.seed {
        settings.seed = seed
            .parse()
            .with_context(|| format!("seed must be a 64-bit integer, got '{seed}'"))?;
    }
    if let Some(total) = &options.total {
        let total: u32 = total
            .parse()
            .with_context(|| format!("total samples must be a positive integer, got '{total}'"))?;
        settings.total_samples = Some(total);
        // An explicit total only applies when no component pins its own count.
        for component in &mut settings.components {
            component.sample_count = 0;
        }
    }
    if let Some(size) = &options.point_size {
        settings.point_size = size
            .parse()
            .with_context(|| format!("point size must be a number, got '{size}'"))?;
    }
    if options.randomize_covariance {
        randomize_covariances(
            &mut settings.components,
            settings.seed,
            &RandomSpdGenerator::default(),
        );
    }
    settings
        .validate(!options.skip_density)
        .context("invalid scene settings")?;
    Ok(settings)
}

fn parse_options() -> Result<CliOptions> {
    let mut options = CliOptions {
        config: None,
        out_dir: PathBuf::from("scatter_out"),
        seed: None,
        total: None,
        point_size: None,
        randomize_covariance: false,
        skip_density: false,
    };
    for arg in env::args().skip(1) {
        if let Some(value) = arg.strip_prefix("--config=") {
            options.config = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--out=") {
            options.out_dir = PathBuf::from(value);
        } else if let Some(value) = arg.strip_prefix("--seed=") {
            options.seed = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--total=") {
            options.total = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--point-size=") {
            options.point_size = Some(value.to_string());
        } else if arg == "--randomize-covariance" {
            options.randomize_covariance = true;
        } else if arg == "--skip-density" {
            options.skip_density = true;
        } else {
            bail!("unrecognized argument '{arg}'");
        }
    }
    Ok(options)
}

mod tracer {
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt().try_init();
    }
}
