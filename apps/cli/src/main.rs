// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! cctv-locate - floor-map and camera location queries from the command line.
//!
//! A scene file describes the floor size, altitude zones and cameras; the
//! floor image is passed separately.
//!
//! # Commands
//!
//! - `render` - synthesize camera views and the annotated floor map
//! - `locate-camera` - floor position in meters to a camera pixel
//! - `locate-world` - camera pixel to a floor position in meters
//! - `locate-event` - floor position to a pixel in every camera

use anyhow::{Context, Result};
use cctv_locate_engine::{LocationDetector, SceneConfig};
use cctv_locate_geometry::{Pixel, Point2D};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "cctv-locate")]
#[command(about = "Map locations between a floor plan and calibrated CCTV cameras")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    scene: SceneArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Args)]
struct SceneArgs {
    /// Scene description (JSON).
    #[arg(long, global = true, default_value = "scene.json")]
    scene: PathBuf,

    /// Floor map image.
    #[arg(long, global = true, default_value = "floor.png")]
    floor: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render camera views and the floor overlay into the output directory.
    Render {
        /// Only render this camera.
        #[arg(long)]
        camera: Option<i32>,

        /// Also write views with zone outlines drawn on top.
        #[arg(long)]
        annotate: bool,
    },

    /// Find the camera pixel showing a floor position.
    LocateCamera {
        /// Camera index.
        #[arg(long)]
        camera: i32,
        /// Floor x in meters.
        #[arg(long)]
        x: f64,
        /// Floor y in meters.
        #[arg(long)]
        y: f64,
    },

    /// Find the floor position seen at a camera pixel.
    LocateWorld {
        /// Camera index.
        #[arg(long)]
        camera: i32,
        /// Pixel column.
        #[arg(long)]
        px: i32,
        /// Pixel row.
        #[arg(long)]
        py: i32,
    },

    /// Project a floor event into every camera.
    LocateEvent {
        /// Floor x in meters.
        #[arg(long)]
        x: f64,
        /// Floor y in meters.
        #[arg(long)]
        y: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    tracing::info!(
        worker_threads = config.worker_threads,
        output_dir = %config.output_dir.display(),
        background = config.background,
        "Starting cctv-locate"
    );

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to build rayon thread pool")?;

    match cli.command {
        Commands::Render { camera, annotate } => {
            let mut detector = load_detector(&cli.scene, &config)?;
            run_render(&mut detector, &config, camera, annotate)
        }
        Commands::LocateCamera { camera, x, y } => {
            let detector = load_detector(&cli.scene, &config)?;
            let pixel = detector.locate_in_camera(Point2D::new(x, y), camera)?;
            let model = detector.camera(camera)?;
            let note = if pixel.is_within(model.frame_width(), model.frame_height()) {
                ""
            } else {
                " (outside frame)"
            };
            println!("camera {}: pixel ({}, {}){}", camera, pixel.x, pixel.y, note);
            Ok(())
        }
        Commands::LocateWorld { camera, px, py } => {
            let detector = load_detector(&cli.scene, &config)?;
            match detector.locate_on_world_map(Pixel::new(px, py), camera)? {
                Some(p) => println!("floor ({:.2} m, {:.2} m)", p.x, p.y),
                None => println!("pixel ({}, {}) sees no floor", px, py),
            }
            Ok(())
        }
        Commands::LocateEvent { x, y } => {
            let detector = load_detector(&cli.scene, &config)?;
            for sighting in detector.locate_event(Point2D::new(x, y)) {
                println!(
                    "camera {}: pixel ({}, {}){}",
                    sighting.camera,
                    sighting.pixel.x,
                    sighting.pixel.y,
                    if sighting.in_frame { "" } else { " (outside frame)" }
                );
            }
            Ok(())
        }
    }
}

fn load_detector(args: &SceneArgs, config: &Config) -> Result<LocationDetector> {
    tracing::info!("Loading scene: {}", args.scene.display());
    let scene = SceneConfig::load(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let detector = LocationDetector::open(&scene, &args.floor)
        .with_context(|| format!("Failed to set up scene on {}", args.floor.display()))?
        .with_background(config.background_color());
    Ok(detector)
}

fn run_render(
    detector: &mut LocationDetector,
    config: &Config,
    camera: Option<i32>,
    annotate: bool,
) -> Result<()> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;

    let rendered = match camera {
        Some(index) => vec![(index, detector.render(index)?)],
        None => detector.render_all()?,
    };

    for (index, stats) in &rendered {
        let path = config.output_dir.join(format!("camera_{}.png", index));
        save(detector.view(*index)?, &path)?;
        println!(
            "camera {}: {}/{} pixels see the floor ({:.1}%) -> {}",
            index,
            stats.resolved,
            stats.total,
            stats.coverage() * 100.0,
            path.display()
        );

        if annotate {
            let path = config.output_dir.join(format!("camera_{}_zones.png", index));
            save(&detector.annotated_view(*index)?, &path)?;
        }
    }

    let path = config.output_dir.join("floor_overlay.png");
    save(&detector.floor_overlay(), &path)?;
    println!("floor overlay -> {}", path.display());
    Ok(())
}

fn save(img: &image::RgbImage, path: &Path) -> Result<()> {
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
