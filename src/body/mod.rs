pub mod kind;
pub mod presets;
pub mod system;

use nalgebra::Vector3;
use thiserror::Error;

use crate::orbital::{InvalidElements, OrbitalElements};
use crate::render::color::Rgb;

pub use kind::{BodyKind, KindCapabilities};
pub use system::SolarSystem;

/// Index of a body in its [`SolarSystem`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

#[derive(Debug, Error, PartialEq)]
pub enum BodyError {
    #[error("body `{name}` references parent #{parent} which is not yet in the system")]
    ParentNotLoaded { name: String, parent: usize },
    #[error("body `{0}` has orbital elements but no parent")]
    OrbitWithoutParent(String),
    #[error("body `{name}` has invalid orbital elements: {source}")]
    InvalidElements {
        name: String,
        #[source]
        source: InvalidElements,
    },
    #[error("body `{name}` has non-positive radius {radius}")]
    BadRadius { name: String, radius: f64 },
}

// ---------------------------------------------------------------------------
// Shade table
// ---------------------------------------------------------------------------

/// 256 pre-shaded copies of a base color, indexed by quantized intensity.
///
/// Entry `i` is `(base·i + 127) / 255` per channel, so entry 0 is black and
/// entry 255 is the base color itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ShadeLut {
    base: Rgb,
    entries: [Rgb; 256],
}

impl ShadeLut {
    pub fn new(base: Rgb) -> Self {
        let mut entries = [Rgb::BLACK; 256];
        let ch = |c: u8, i: u32| ((c as u32 * i + 127) / 255) as u8;
        for (i, e) in entries.iter_mut().enumerate() {
            let i = i as u32;
            *e = Rgb::new(ch(base.r, i), ch(base.g, i), ch(base.b, i));
        }
        Self { base, entries }
    }

    pub fn base(&self) -> Rgb {
        self.base
    }

    pub fn get(&self, idx: usize) -> Rgb {
        self.entries[idx.min(255)]
    }

    /// Look up an intensity in [0, 1] (rounded to the nearest bucket).
    pub fn shade(&self, intensity: f64) -> Rgb {
        let idx = (intensity.clamp(0.0, 1.0) * 255.0 + 0.5) as usize;
        self.get(idx)
    }
}

impl std::fmt::Debug for ShadeLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadeLut").field("base", &self.base).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Celestial body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    pub radius: f64,                         // sim units
    pub elements: Option<OrbitalElements>,   // None = stationary
    pub parent: Option<BodyId>,
    pub position: Vector3<f64>,              // world, engine frame; derived each tick
    color: Rgb,
    shade: ShadeLut,
    root_star: Option<BodyId>,               // resolved when added to a system
}

impl CelestialBody {
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Change the base color; the shade table follows.
    pub fn set_color(&mut self, color: Rgb) {
        if color != self.color {
            self.color = color;
            self.shade = ShadeLut::new(color);
        }
    }

    pub fn shade(&self) -> &ShadeLut {
        &self.shade
    }

    /// Root star of this body's parent chain (the star itself for a star).
    pub fn root_star(&self) -> Option<BodyId> {
        self.root_star
    }

    pub(crate) fn set_root_star(&mut self, star: Option<BodyId>) {
        self.root_star = star;
    }

    pub fn capabilities(&self) -> KindCapabilities {
        self.kind.capabilities()
    }
}

// ---------------------------------------------------------------------------
// Body builder
// ---------------------------------------------------------------------------

pub struct BodyBuilder {
    name: String,
    kind: BodyKind,
    radius: f64,
    color: Rgb,
    elements: Option<OrbitalElements>,
    parent: Option<BodyId>,
    position: Vector3<f64>,
}

impl BodyBuilder {
    pub fn new(name: impl Into<String>, kind: BodyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            radius: 1.0,
            color: Rgb::WHITE,
            elements: None,
            parent: None,
            position: Vector3::zeros(),
        }
    }

    pub fn radius(mut self, v: f64) -> Self { self.radius = v; self }
    pub fn color(mut self, v: Rgb) -> Self { self.color = v; self }
    pub fn position(mut self, v: Vector3<f64>) -> Self { self.position = v; self }

    pub fn orbit(mut self, parent: BodyId, elements: OrbitalElements) -> Self {
        self.parent = Some(parent);
        self.elements = Some(elements);
        self
    }

    pub fn build(self) -> CelestialBody {
        CelestialBody {
            name: self.name,
            kind: self.kind,
            radius: self.radius,
            elements: self.elements,
            parent: self.parent,
            position: self.position,
            color: self.color,
            shade: ShadeLut::new(self.color),
            root_star: None,
        }
    }
}
