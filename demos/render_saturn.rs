use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use orrery::body::presets;
use orrery::io::write_ppm_file;
use orrery::render::RingDefaults;
use orrery::{FrameBuffer, Scene};

fn main() -> Result<()> {
    let system = presets::saturn_system(&RingDefaults::default())?;
    let mut scene = Scene::new(system, 800, 600);

    scene.controller.config.lock_height_radii = 6.0;
    if !scene.lock_to("Saturn") {
        bail!("preset has no Saturn");
    }
    // The lock offset is straight above the planet, so look down.
    scene.controller.set_orientation(90.0, -89.0);

    let mut fb = FrameBuffer::new(800, 600);
    let report = scene.render_frame(Duration::from_millis(16), &mut fb);
    println!("Shaded bodies: {}  flat: {}  points: {}", report.shaded, report.flat, report.points);
    println!("Lit pixels:    {}", fb.count_lit());
    println!("Frame time:    {:.2} ms", scene.stats.last_ms());

    write_ppm_file(Path::new("saturn.ppm"), &fb)?;
    println!("Wrote saturn.ppm");
    Ok(())
}
