use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use nalgebra::Vector3;
use tracing::{debug, warn};

use super::error::{LoadError, LoadResult};
use crate::body::{BodyBuilder, BodyId, BodyKind, CelestialBody, SolarSystem};
use crate::orbital::OrbitalElements;
use crate::render::color::Rgb;
use crate::render::rings::{RingBand, RingDefaults, RingSystem};

// ---------------------------------------------------------------------------
// Save-file layout
// ---------------------------------------------------------------------------
//
//   <simulation time, ns>
//   <planet count>      then  x y z radius R G B a e i Ω ω M0 periodDays name
//   <ring system count> then  planet angularSpeed nx ny nz shadowBrightness shadowSoftness bandCount
//                             followed by bandCount lines: inner outer particleCount argb opticalDepth
//   <moon count>        then  planet record + parent planet name as the last token
//   <asteroid count>    then  planet record
//
// Angles are degrees, `#` starts a comment line, blank lines are ignored.
// The root star is not stored; the loader creates it at the origin.

const RECORD_NUMBERS: usize = 14;
const RING_HEADER_FIELDS: usize = 8;
const BAND_FIELDS: usize = 5;

/// How the loader builds the bits the file does not carry.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub star_name: String,
    pub star_radius: f64,
    pub star_color: Rgb,
    pub rings: RingDefaults,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            star_name: "Sun".to_string(),
            star_radius: 6963.4,
            star_color: Rgb::new(239, 142, 56),
            rings: RingDefaults::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Line reader
// ---------------------------------------------------------------------------

struct DataLines<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> DataLines<R> {
    fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line_no: 0 }
    }

    /// Next non-blank, non-comment line, or `None` at end of input.
    fn next_data(&mut self) -> LoadResult<Option<(usize, String)>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some((self.line_no, trimmed.to_string())));
        }
        Ok(None)
    }

    fn expect(&mut self, expected: &'static str) -> LoadResult<(usize, String)> {
        self.next_data()?.ok_or(LoadError::UnexpectedEof { expected })
    }

    /// A section count. End of input here ends the file cleanly.
    fn section_count(&mut self, section: &'static str) -> LoadResult<Option<usize>> {
        match self.next_data()? {
            None => Ok(None),
            Some((line, text)) => parse_field(line, &text, section).map(Some),
        }
    }
}

fn parse_field<T: FromStr>(line: usize, token: &str, what: &str) -> LoadResult<T> {
    token
        .parse()
        .map_err(|_| LoadError::parse(line, format!("bad {}: `{}`", what, token)))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

struct BodyRecord {
    position: Vector3<f64>,
    radius: f64,
    color: Rgb,
    elements: OrbitalElements,
    name: String,
}

fn parse_record(line: usize, tokens: &[&str]) -> LoadResult<BodyRecord> {
    if tokens.len() <= RECORD_NUMBERS {
        return Err(LoadError::parse(
            line,
            format!("body record needs {} fields, found {}", RECORD_NUMBERS + 1, tokens.len()),
        ));
    }
    let f = |i: usize, what: &str| parse_field::<f64>(line, tokens[i], what);
    let c = |i: usize| parse_field::<u8>(line, tokens[i], "color channel");

    Ok(BodyRecord {
        position: Vector3::new(f(0, "x")?, f(1, "y")?, f(2, "z")?),
        radius: f(3, "radius")?,
        color: Rgb::new(c(4)?, c(5)?, c(6)?),
        elements: OrbitalElements::from_degrees(
            f(7, "semi-major axis")?,
            f(8, "eccentricity")?,
            f(9, "inclination")?,
            f(10, "ascending node")?,
            f(11, "argument of periapsis")?,
            f(12, "mean anomaly")?,
            f(13, "period")?,
        ),
        name: tokens[RECORD_NUMBERS].to_string(),
    })
}

fn record_body(rec: BodyRecord, kind: BodyKind, parent: BodyId) -> CelestialBody {
    BodyBuilder::new(rec.name, kind)
        .radius(rec.radius)
        .color(rec.color)
        .position(rec.position)
        .orbit(parent, rec.elements)
        .build()
}

fn read_ring_system<R: BufRead>(
    lines: &mut DataLines<R>,
    system: &mut SolarSystem,
    config: &LoaderConfig,
) -> LoadResult<()> {
    let (line, header) = lines.expect("ring system header")?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() < RING_HEADER_FIELDS {
        return Err(LoadError::parse(line, "ring header needs 8 fields"));
    }
    let f = |i: usize, what: &str| parse_field::<f64>(line, tokens[i], what);
    let planet_name = tokens[0];
    let angular_speed = f(1, "angular speed")?;
    let normal = Vector3::new(f(2, "normal x")?, f(3, "normal y")?, f(4, "normal z")?);
    let shadow_brightness = f(5, "shadow brightness")?;
    let shadow_softness = f(6, "shadow softness")?;
    let band_count: usize = parse_field(line, tokens[7], "band count")?;

    let planet = system
        .find(planet_name)
        .filter(|&id| system[id].kind == BodyKind::Planet);
    let Some(planet) = planet else {
        warn!(planet = planet_name, line, "ring system names an unknown planet, skipped");
        for _ in 0..band_count {
            lines.expect("ring band")?;
        }
        return Ok(());
    };

    let planet_radius = system[planet].radius;
    let mut rings = RingSystem::new(planet, angular_speed, normal);
    rings.shadow_brightness = shadow_brightness;
    rings.shadow_softness = shadow_softness;

    for _ in 0..band_count {
        let (line, text) = lines.expect("ring band")?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < BAND_FIELDS {
            return Err(LoadError::parse(line, "ring band needs 5 fields"));
        }
        // Colors are written as signed 32-bit ARGB.
        let argb: i64 = parse_field(line, tokens[3], "band color")?;
        let band = RingBand {
            inner: parse_field(line, tokens[0], "inner radius")?,
            outer: parse_field(line, tokens[1], "outer radius")?,
            particle_count: parse_field(line, tokens[2], "particle count")?,
            color: Rgb::from_packed(argb as u32),
            optical_depth: parse_field(line, tokens[4], "optical depth")?,
        };
        if !(band.inner >= 0.0 && band.outer > band.inner) {
            return Err(LoadError::parse(line, "ring band radii must satisfy 0 <= inner < outer"));
        }
        rings.add_band(band, planet_name, planet_radius, &config.rings);
    }

    system.add_ring_system(rings);
    Ok(())
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a save file into a fresh system, positioned at the stored time.
///
/// Bodies with invalid elements are rejected here, so the propagator only
/// ever sees validated input.
pub fn load_system<R: BufRead>(reader: R, config: &LoaderConfig) -> LoadResult<SolarSystem> {
    let mut lines = DataLines::new(reader);
    let mut system = SolarSystem::new();

    let star = system.add_body(
        BodyBuilder::new(config.star_name.clone(), BodyKind::Star)
            .radius(config.star_radius)
            .color(config.star_color)
            .build(),
    )?;

    let (line, text) = lines.expect("simulation time")?;
    let time_ns: i64 = parse_field(line, &text, "simulation time")?;
    system.time = time_ns as f64 * 1e-9;

    'sections: {
        let Some(planets) = lines.section_count("planet count")? else { break 'sections };
        for _ in 0..planets {
            let (line, text) = lines.expect("planet record")?;
            let tokens: Vec<&str> = text.split_whitespace().collect();
            let rec = parse_record(line, &tokens)?;
            system.add_body(record_body(rec, BodyKind::Planet, star))?;
        }

        let Some(ring_systems) = lines.section_count("ring system count")? else { break 'sections };
        for _ in 0..ring_systems {
            read_ring_system(&mut lines, &mut system, config)?;
        }

        let Some(moons) = lines.section_count("moon count")? else { break 'sections };
        for _ in 0..moons {
            let (line, text) = lines.expect("moon record")?;
            let mut tokens: Vec<&str> = text.split_whitespace().collect();
            let parent_name = tokens.pop().unwrap_or_default();
            let rec = parse_record(line, &tokens)?;

            let first_planet = system.of_kind(BodyKind::Planet).map(|(id, _)| id).next();
            let parent = match system.find(parent_name).filter(|&id| system[id].kind == BodyKind::Planet) {
                Some(id) => id,
                None => {
                    let fallback = first_planet
                        .ok_or_else(|| LoadError::parse(line, "moon record but no planets loaded"))?;
                    warn!(moon = %rec.name, parent = parent_name, line, "unknown parent planet, attaching to first planet");
                    fallback
                }
            };
            system.add_body(record_body(rec, BodyKind::Moon, parent))?;
        }

        let Some(asteroids) = lines.section_count("asteroid count")? else { break 'sections };
        for _ in 0..asteroids {
            let (line, text) = lines.expect("asteroid record")?;
            let tokens: Vec<&str> = text.split_whitespace().collect();
            let rec = parse_record(line, &tokens)?;
            system.add_body(record_body(rec, BodyKind::Asteroid, star))?;
        }
    }

    let t = system.time;
    system.propagate_all(t);
    debug!(
        bodies = system.len(),
        rings = system.rings().len(),
        time_s = t,
        "system loaded"
    );
    Ok(system)
}

pub fn load_system_file(path: &Path, config: &LoaderConfig) -> LoadResult<SolarSystem> {
    let reader = BufReader::new(File::open(path)?);
    load_system(reader, config)
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

fn write_record<W: Write>(writer: &mut W, body: &CelestialBody, el: &OrbitalElements) -> io::Result<()> {
    let p = body.position;
    let c = body.color();
    write!(
        writer,
        "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
        p.x,
        p.y,
        p.z,
        body.radius,
        c.r,
        c.g,
        c.b,
        el.a,
        el.e,
        el.inc.to_degrees(),
        el.raan.to_degrees(),
        el.argp.to_degrees(),
        el.m0.to_degrees(),
        el.period_days(),
        body.name,
    )
}

/// Orbiting bodies of `kind`; bodies without elements cannot be stored.
fn stored<'a>(
    system: &'a SolarSystem,
    kind: BodyKind,
) -> Vec<(BodyId, &'a CelestialBody, &'a OrbitalElements)> {
    system
        .of_kind(kind)
        .filter_map(|(id, b)| match &b.elements {
            Some(el) => Some((id, b, el)),
            None => {
                warn!(name = %b.name, "stationary {} not saved", kind);
                None
            }
        })
        .collect()
}

/// Write `system` in the format [`load_system`] reads.
pub fn save_system<W: Write>(writer: &mut W, system: &SolarSystem) -> io::Result<()> {
    writeln!(writer, "{}", (system.time * 1e9).round() as i64)?;

    let planets = stored(system, BodyKind::Planet);
    writeln!(writer, "{}", planets.len())?;
    for (_, body, el) in &planets {
        write_record(writer, body, el)?;
        writeln!(writer)?;
    }

    let rings: Vec<&RingSystem> = system
        .rings()
        .iter()
        .filter(|r| !r.bands().is_empty() && system.get(r.planet()).is_some())
        .collect();
    writeln!(writer, "{}", rings.len())?;
    for r in rings {
        let n = r.normal();
        writeln!(
            writer,
            "{} {} {} {} {} {} {} {}",
            system[r.planet()].name,
            r.angular_speed,
            n.x,
            n.y,
            n.z,
            r.shadow_brightness,
            r.shadow_softness,
            r.bands().len()
        )?;
        for prepared in r.bands() {
            let b = &prepared.band;
            let argb = (0xFF00_0000 | b.color.packed()) as i32;
            writeln!(writer, "{} {} {} {} {}", b.inner, b.outer, b.particle_count, argb, b.optical_depth)?;
        }
    }

    let moons = stored(system, BodyKind::Moon);
    writeln!(writer, "{}", moons.len())?;
    for (_, body, el) in &moons {
        write_record(writer, body, el)?;
        let parent = body.parent.map_or("", |p| system[p].name.as_str());
        writeln!(writer, " {}", parent)?;
    }

    let asteroids = stored(system, BodyKind::Asteroid);
    writeln!(writer, "{}", asteroids.len())?;
    for (_, body, el) in &asteroids {
        write_record(writer, body, el)?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn save_system_file(path: &Path, system: &SolarSystem) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_system(&mut writer, system)?;
    writer.flush()
}
