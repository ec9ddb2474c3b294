use anyhow::Result;
use orrery::body::presets;
use orrery::orbital::SECONDS_PER_DAY;

fn main() -> Result<()> {
    println!("=== Earth and Moon over one lunar month ===\n");

    let mut system = presets::sun_earth_moon()?;
    let (Some(earth), Some(moon)) = (system.find("Earth"), system.find("Moon")) else {
        anyhow::bail!("preset is missing Earth or the Moon");
    };

    if let Some(el) = system[moon].elements {
        println!("Moon orbit: a={:.0} units, e={:.4}, period={:.2} days", el.a, el.e, el.period_days());
        println!("Periapsis: {:.0} units   Apoapsis: {:.0} units", el.periapsis(), el.apoapsis());
        println!();
    }

    // The Moon-Earth distance swings between periapsis and apoapsis.
    for day in (0..=28).step_by(4) {
        let t = day as f64 * SECONDS_PER_DAY;
        system.propagate_all(t);
        let e = system[earth].position;
        let m = system[moon].position;
        println!(
            "  day {:>2}: earth=({:>11.0}, {:>7.0}, {:>11.0})  moon-earth={:>7.1}",
            day,
            e.x,
            e.y,
            e.z,
            (m - e).norm(),
        );
    }

    println!();
    println!("Positions are in the engine frame (y is ecliptic north).");
    Ok(())
}
