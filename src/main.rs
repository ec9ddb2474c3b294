use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use orrery::body::presets;
use orrery::body::BodyKind;
use orrery::io::{self, LoaderConfig, StarCatalog};
use orrery::render::hud::format_sim_speed;
use orrery::render::RingDefaults;
use orrery::scene::{Scene, SceneCommand};
use orrery::{FrameBuffer, SolarSystem};

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Keplerian solar-system propagation and software rendering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    SunEarthMoon,
    Saturn,
    Inner,
}

#[derive(clap::Args)]
struct SystemSource {
    /// Save file to load (overrides --preset)
    #[arg(short, long)]
    system: Option<PathBuf>,

    /// Built-in system used when no save file is given
    #[arg(short, long, value_enum, default_value = "inner")]
    preset: Preset,
}

#[derive(Subcommand)]
enum Commands {
    /// Render frames headlessly and write the last one as a PPM image
    Render {
        #[command(flatten)]
        source: SystemSource,
        /// Binary STAR catalog for the background
        #[arg(long)]
        stars: Option<PathBuf>,
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        #[arg(short, long, default_value = "30")]
        frames: u32,
        /// Repaint cadence of the timer thread
        #[arg(long, default_value = "30")]
        fps: u32,
        /// Time level: 2^(level-1) sim seconds per real second
        #[arg(long, default_value = "1")]
        time_level: u32,
        /// Lock the camera to this body
        #[arg(long)]
        lock: Option<String>,
        /// Camera offset above a locked body, in body radii
        #[arg(long, default_value = "2.0")]
        lock_height: f64,
        /// Camera yaw and pitch in degrees
        #[arg(long, num_args = 2, value_names = ["YAW", "PITCH"], allow_negative_numbers = true)]
        look: Option<Vec<f64>>,
        #[arg(long)]
        labels: bool,
        #[arg(long)]
        orbits: bool,
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
    },

    /// Print body positions at a simulation time
    Propagate {
        #[command(flatten)]
        source: SystemSource,
        /// Days after the system's saved time
        #[arg(short, long, default_value = "0")]
        days: f64,
    },

    /// Write a system to a save file
    Save {
        #[command(flatten)]
        source: SystemSource,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate a synthetic star catalog
    GenerateStars {
        #[arg(short, long, default_value = "20000")]
        count: usize,
        #[arg(long, default_value = "42")]
        seed: u64,
        #[arg(short, long, default_value = "stars.bin")]
        output: PathBuf,
    },
}

fn load_source(source: &SystemSource) -> Result<SolarSystem> {
    if let Some(path) = &source.system {
        return io::load_system_file(path, &LoaderConfig::default())
            .with_context(|| format!("loading {}", path.display()));
    }
    let rings = RingDefaults::default();
    let system = match source.preset {
        Preset::SunEarthMoon => presets::sun_earth_moon()?,
        Preset::Saturn => presets::saturn_system(&rings)?,
        Preset::Inner => presets::inner_solar_system(&rings)?,
    };
    Ok(system)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            stars,
            width,
            height,
            frames,
            fps,
            time_level,
            lock,
            lock_height,
            look,
            labels,
            orbits,
            output,
        } => {
            let system = load_source(&source)?;
            let mut scene = Scene::new(system, width, height);
            if let Some(path) = &stars {
                let catalog = io::read_catalog_file(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                scene.set_catalog(Some(catalog));
            }
            scene.clock.set_level(time_level);
            scene.controller.config.lock_height_radii = lock_height;
            if let Some(name) = &lock {
                if !scene.lock_to(name) {
                    bail!("no body named `{}`", name);
                }
            }
            if let Some(angles) = &look {
                scene.controller.set_orientation(angles[0], angles[1]);
            }
            if labels {
                scene.apply(SceneCommand::ToggleLabels);
            }
            if orbits {
                scene.apply(SceneCommand::ToggleOrbits(BodyKind::Planet));
                scene.apply(SceneCommand::ToggleOrbits(BodyKind::Moon));
            }
            run_headless(&mut scene, frames, fps, &output)?;
        }

        Commands::Propagate { source, days } => {
            let mut system = load_source(&source)?;
            let t = system.time + days * orrery::orbital::SECONDS_PER_DAY;
            system.propagate_all(t);
            print_positions(&system, days);
        }

        Commands::Save { source, output } => {
            let system = load_source(&source)?;
            io::save_system_file(&output, &system)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(bodies = system.len(), path = %output.display(), "system saved");
        }

        Commands::GenerateStars { count, seed, output } => {
            let catalog = synthetic_catalog(count, seed);
            io::write_catalog_file(&output, &catalog)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(stars = catalog.len(), path = %output.display(), "catalog written");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Headless frame loop
// ---------------------------------------------------------------------------

/// Drive `frames` repaints from a timer thread, then write the last frame.
fn run_headless(scene: &mut Scene, frames: u32, fps: u32, output: &Path) -> Result<()> {
    let interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let (tx, rx) = mpsc::channel::<()>();
    let ticker = thread::spawn(move || {
        for _ in 0..frames {
            thread::sleep(interval);
            if tx.send(()).is_err() {
                break;
            }
        }
    });

    let mut fb = FrameBuffer::new(scene.camera.width() as usize, scene.camera.height() as usize);
    let mut last = Instant::now();
    let mut drawn = 0u32;
    while rx.recv().is_ok() {
        let now = Instant::now();
        scene.render_frame(now - last, &mut fb);
        last = now;
        drawn += 1;
    }
    if ticker.join().is_err() {
        bail!("timer thread panicked");
    }
    if drawn == 0 {
        scene.render_frame(Duration::ZERO, &mut fb);
    }

    io::write_ppm_file(output, &fb).with_context(|| format!("writing {}", output.display()))?;

    println!();
    println!("  Render Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Frames:        {:>8}       Spikes:       {:>8}", scene.stats.frames(), scene.stats.spikes());
    println!("  Mean frame:    {:>8.2} ms    Last frame:   {:>8.2} ms", scene.stats.mean_ms(), scene.stats.last_ms());
    println!("  Sim time:      {:>8.0} s     Sim speed:    {}", scene.clock.seconds(), format_sim_speed(scene.clock.display_speed()));
    println!("  Lit pixels:    {:>8}       Output:       {}", fb.count_lit(), output.display());
    for line in &fb.hud {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn print_positions(system: &SolarSystem, days: f64) {
    println!();
    println!("  Body Positions  (t = {:.3} s, +{} days)", system.time, days);
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:<10}  {:>8}  {:>14}  {:>14}  {:>14}  {:>12}",
        "name", "kind", "x", "y", "z", "r parent"
    );
    println!("  {}", "─".repeat(82));
    for (_, body) in system.iter() {
        let to_parent = body
            .parent
            .map_or(0.0, |p| (body.position - system[p].position).norm());
        println!(
            "  {:<10}  {:>8}  {:>14.1}  {:>14.1}  {:>14.1}  {:>12.1}",
            body.name, body.kind.name(), body.position.x, body.position.y, body.position.z, to_parent
        );
    }
    println!();
}

/// Uniform directions on the sphere with a roughly realistic magnitude
/// distribution (many faint, few bright).
fn synthetic_catalog(count: usize, seed: u64) -> StarCatalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut catalog = StarCatalog::default();
    for _ in 0..count {
        let z: f64 = rng.gen_range(-1.0..1.0);
        let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let s = (1.0 - z * z).sqrt();
        let dir = [(s * phi.cos()) as f32, z as f32, (s * phi.sin()) as f32];

        let mag = 6.5 - 8.0 * rng.gen::<f64>().powf(4.0);
        let temp: f64 = rng.gen();
        let (r, g, b) = if temp < 0.2 {
            (200u32, 215, 255)
        } else if temp < 0.7 {
            (255, 250, 240)
        } else {
            (255, 215, 170)
        };
        catalog.push(dir, mag as f32, 0xFF00_0000 | (r << 16) | (g << 8) | b);
    }
    catalog
}
