//! Built-in systems for demos, the headless CLI and tests.
//!
//! Distances are sim units (1 unit = 100 km), periods in days.

use super::{BodyBuilder, BodyError, BodyId, BodyKind, CelestialBody, SolarSystem};
use crate::orbital::frame::orbit_normal_ecliptic;
use crate::orbital::{ecliptic_to_engine, OrbitalElements};
use crate::render::color::Rgb;
use crate::render::rings::{RingBand, RingDefaults, RingSystem};

pub const SUN_RADIUS: f64 = 6963.4;
pub const SUN_COLOR: Rgb = Rgb::new(239, 142, 56);

fn sun() -> CelestialBody {
    BodyBuilder::new("Sun", BodyKind::Star).radius(SUN_RADIUS).color(SUN_COLOR).build()
}

#[allow(clippy::too_many_arguments)]
fn orbiting(
    name: &str,
    kind: BodyKind,
    radius: f64,
    color: Rgb,
    parent: BodyId,
    a: f64,
    e: f64,
    inc_deg: f64,
    period_days: f64,
) -> CelestialBody {
    // Node, periapsis and epoch anomaly spread from the name so bodies do not line up.
    let spread = (name.bytes().map(u32::from).sum::<u32>() % 360) as f64;
    BodyBuilder::new(name, kind)
        .radius(radius)
        .color(color)
        .orbit(
            parent,
            OrbitalElements::from_degrees(a, e, inc_deg, spread, 2.0 * spread, 3.0 * spread, period_days),
        )
        .build()
}

/// Saturn's main rings (C, B, A), pole tilted 26.7° from the ecliptic.
pub fn saturn_rings(planet: BodyId, planet_name: &str, planet_radius: f64, defaults: &RingDefaults) -> RingSystem {
    let pole = ecliptic_to_engine(&orbit_normal_ecliptic(26.73_f64.to_radians(), 169.5_f64.to_radians()));
    let mut rings = RingSystem::new(planet, 1.75e-4, pole);
    rings.shadow_brightness = defaults.shadow_brightness;
    rings.shadow_softness = defaults.shadow_softness;
    let bands = [
        RingBand { inner: 746.6, outer: 920.0, particle_count: 6_000, color: Rgb::new(160, 140, 120), optical_depth: 0.15 },
        RingBand { inner: 920.0, outer: 1175.8, particle_count: 12_000, color: Rgb::new(215, 195, 160), optical_depth: 0.9 },
        RingBand { inner: 1221.7, outer: 1367.8, particle_count: 8_000, color: Rgb::new(200, 185, 155), optical_depth: 0.5 },
    ];
    for band in bands {
        rings.add_band(band, planet_name, planet_radius, defaults);
    }
    rings
}

/// Sun, Earth, the Moon and Ceres.
pub fn sun_earth_moon() -> Result<SolarSystem, BodyError> {
    let mut sys = SolarSystem::new();
    let sun = sys.add_body(sun())?;
    let earth = sys.add_body(orbiting("Earth", BodyKind::Planet, 63.71, Rgb::new(70, 110, 200), sun, 1.496e6, 0.0167, 0.0, 365.256))?;
    sys.add_body(orbiting("Moon", BodyKind::Moon, 17.37, Rgb::new(190, 190, 190), earth, 3_844.0, 0.0549, 5.145, 27.32))?;
    sys.add_body(orbiting("Ceres", BodyKind::Asteroid, 4.7, Rgb::new(150, 140, 130), sun, 4.139e6, 0.0785, 10.59, 1_680.5))?;
    sys.propagate_all(0.0);
    Ok(sys)
}

/// Sun, Saturn with rings, and Titan.
pub fn saturn_system(defaults: &RingDefaults) -> Result<SolarSystem, BodyError> {
    let mut sys = SolarSystem::new();
    let sun = sys.add_body(sun())?;
    let saturn = sys.add_body(orbiting("Saturn", BodyKind::Planet, 582.32, Rgb::new(210, 190, 140), sun, 1.4335e7, 0.0565, 2.49, 10_759.2))?;
    sys.add_body(orbiting("Titan", BodyKind::Moon, 25.75, Rgb::new(220, 170, 90), saturn, 12_219.0, 0.0288, 0.35, 15.945))?;
    sys.add_ring_system(saturn_rings(saturn, "Saturn", 582.32, defaults));
    sys.propagate_all(0.0);
    Ok(sys)
}

/// The Sun, the planets out to Saturn, major moons, Ceres and Saturn's rings.
pub fn inner_solar_system(defaults: &RingDefaults) -> Result<SolarSystem, BodyError> {
    let mut sys = SolarSystem::new();
    let sun = sys.add_body(sun())?;
    sys.add_body(orbiting("Mercury", BodyKind::Planet, 24.4, Rgb::new(160, 150, 140), sun, 5.791e5, 0.2056, 7.0, 87.97))?;
    sys.add_body(orbiting("Venus", BodyKind::Planet, 60.52, Rgb::new(230, 200, 140), sun, 1.0821e6, 0.0068, 3.39, 224.7))?;
    let earth = sys.add_body(orbiting("Earth", BodyKind::Planet, 63.71, Rgb::new(70, 110, 200), sun, 1.496e6, 0.0167, 0.0, 365.256))?;
    let mars = sys.add_body(orbiting("Mars", BodyKind::Planet, 33.9, Rgb::new(200, 90, 50), sun, 2.2794e6, 0.0934, 1.85, 686.98))?;
    let jupiter = sys.add_body(orbiting("Jupiter", BodyKind::Planet, 699.11, Rgb::new(200, 170, 130), sun, 7.7857e6, 0.0489, 1.3, 4_332.6))?;
    let saturn = sys.add_body(orbiting("Saturn", BodyKind::Planet, 582.32, Rgb::new(210, 190, 140), sun, 1.4335e7, 0.0565, 2.49, 10_759.2))?;

    sys.add_body(orbiting("Moon", BodyKind::Moon, 17.37, Rgb::new(190, 190, 190), earth, 3_844.0, 0.0549, 5.145, 27.32))?;
    sys.add_body(orbiting("Phobos", BodyKind::Moon, 0.11, Rgb::new(120, 110, 100), mars, 93.77, 0.0151, 1.08, 0.319))?;
    sys.add_body(orbiting("Io", BodyKind::Moon, 18.22, Rgb::new(230, 210, 110), jupiter, 4_217.0, 0.0041, 0.05, 1.769))?;
    sys.add_body(orbiting("Europa", BodyKind::Moon, 15.61, Rgb::new(200, 190, 170), jupiter, 6_709.0, 0.009, 0.47, 3.551))?;
    sys.add_body(orbiting("Ganymede", BodyKind::Moon, 26.34, Rgb::new(160, 150, 140), jupiter, 10_704.0, 0.0013, 0.2, 7.155))?;
    sys.add_body(orbiting("Callisto", BodyKind::Moon, 24.1, Rgb::new(110, 100, 90), jupiter, 18_827.0, 0.0074, 0.19, 16.689))?;
    sys.add_body(orbiting("Titan", BodyKind::Moon, 25.75, Rgb::new(220, 170, 90), saturn, 12_219.0, 0.0288, 0.35, 15.945))?;

    sys.add_body(orbiting("Ceres", BodyKind::Asteroid, 4.7, Rgb::new(150, 140, 130), sun, 4.139e6, 0.0785, 10.59, 1_680.5))?;
    sys.add_body(orbiting("Vesta", BodyKind::Asteroid, 2.63, Rgb::new(170, 160, 150), sun, 3.533e6, 0.0887, 7.14, 1_325.8))?;

    sys.add_ring_system(saturn_rings(saturn, "Saturn", 582.32, defaults));
    sys.propagate_all(0.0);
    Ok(sys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_build() {
        let sys = sun_earth_moon().unwrap();
        assert_eq!(sys.len(), 4);
        let earth = sys.find("Earth").unwrap();
        let moon = sys.find("Moon").unwrap();
        let d = (sys[moon].position - sys[earth].position).norm();
        assert!(d > 3_844.0 * (1.0 - 0.0549) - 1e-6 && d < 3_844.0 * 1.0549 + 1e-6);

        let full = inner_solar_system(&RingDefaults::default()).unwrap();
        assert_eq!(full.of_kind(BodyKind::Planet).count(), 6);
        assert_eq!(full.rings().len(), 1);
    }

    #[test]
    fn saturn_rings_are_tilted() {
        let sys = saturn_system(&RingDefaults::default()).unwrap();
        let rings = &sys.rings()[0];
        let tilt = rings.normal().y.acos().to_degrees();
        assert!((tilt - 26.73).abs() < 1e-6, "ring pole tilt {}", tilt);
        assert_eq!(rings.bands().len(), 3);
        assert!(rings.bands().iter().all(|b| b.weight > 0.0));
    }
}
