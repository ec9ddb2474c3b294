// ---------------------------------------------------------------------------
// Body kinds and their per-kind capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Asteroid,
}

/// Static per-kind rendering traits, looked up instead of dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCapabilities {
    pub icon_px: u32,        // outline icon diameter for sub-pixel bodies
    pub icon_fallback: bool, // may draw the icon when icons are switched on
    pub labelled: bool,      // gets a text label when labels are on
}

const STAR_CAPS: KindCapabilities = KindCapabilities { icon_px: 12, icon_fallback: true, labelled: true };
const PLANET_CAPS: KindCapabilities = KindCapabilities { icon_px: 5, icon_fallback: true, labelled: true };
const MOON_CAPS: KindCapabilities = KindCapabilities { icon_px: 2, icon_fallback: true, labelled: true };
const ASTEROID_CAPS: KindCapabilities = KindCapabilities { icon_px: 2, icon_fallback: true, labelled: true };

impl BodyKind {
    pub const ALL: [BodyKind; 4] = [BodyKind::Star, BodyKind::Planet, BodyKind::Moon, BodyKind::Asteroid];

    pub fn capabilities(self) -> KindCapabilities {
        match self {
            BodyKind::Star => STAR_CAPS,
            BodyKind::Planet => PLANET_CAPS,
            BodyKind::Moon => MOON_CAPS,
            BodyKind::Asteroid => ASTEROID_CAPS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Asteroid => "asteroid",
        }
    }
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_sizes_shrink_with_kind() {
        assert_eq!(BodyKind::Star.capabilities().icon_px, 12);
        assert_eq!(BodyKind::Planet.capabilities().icon_px, 5);
        assert_eq!(BodyKind::Moon.capabilities().icon_px, 2);
        assert_eq!(BodyKind::Asteroid.capabilities().icon_px, 2);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(BodyKind::Asteroid.to_string(), "asteroid");
    }
}
