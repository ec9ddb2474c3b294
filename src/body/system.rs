use std::ops::Index;

use tracing::debug;

use super::{BodyError, BodyId, BodyKind, CelestialBody};
use crate::orbital::propagate;
use crate::render::rings::RingSystem;

// ---------------------------------------------------------------------------
// Solar system arena
// ---------------------------------------------------------------------------

/// Flat arena of bodies plus their ring systems.
///
/// Parents always precede their children, so one in-order pass updates every
/// position from already-updated parents.
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    bodies: Vec<CelestialBody>,
    rings: Vec<RingSystem>,
    pub time: f64, // s, simulation time the system was saved at
}

impl SolarSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body. Its parent must already be in the arena.
    pub fn add_body(&mut self, mut body: CelestialBody) -> Result<BodyId, BodyError> {
        if !(body.radius > 0.0) {
            return Err(BodyError::BadRadius { name: body.name, radius: body.radius });
        }
        if let Some(el) = &body.elements {
            el.validate().map_err(|source| BodyError::InvalidElements {
                name: body.name.clone(),
                source,
            })?;
            if body.parent.is_none() {
                return Err(BodyError::OrbitWithoutParent(body.name));
            }
        }

        let id = BodyId(self.bodies.len());
        let root = match body.parent {
            Some(p) if p.0 >= id.0 => {
                return Err(BodyError::ParentNotLoaded { name: body.name, parent: p.0 });
            }
            Some(p) => self.bodies[p.0].root_star(),
            None if body.kind == BodyKind::Star => Some(id),
            None => None,
        };
        body.set_root_star(root);

        debug!(name = %body.name, kind = %body.kind, id = id.0, "body added");
        self.bodies.push(body);
        Ok(id)
    }

    pub fn add_ring_system(&mut self, rings: RingSystem) -> usize {
        self.rings.push(rings);
        self.rings.len() - 1
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.0)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut CelestialBody> {
        self.bodies.get_mut(id.0)
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.bodies.len()).map(BodyId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &CelestialBody)> + '_ {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn of_kind(&self, kind: BodyKind) -> impl Iterator<Item = (BodyId, &CelestialBody)> + '_ {
        self.iter().filter(move |(_, b)| b.kind == kind)
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies.iter().position(|b| b.name == name).map(BodyId)
    }

    /// The first parentless star, which lights everything orbiting it.
    pub fn root_star(&self) -> Option<BodyId> {
        self.iter()
            .find(|(_, b)| b.kind == BodyKind::Star && b.parent.is_none())
            .map(|(id, _)| id)
    }

    /// Star lighting `id`, or `None` for the star itself and unlit bodies.
    pub fn light_source(&self, id: BodyId) -> Option<BodyId> {
        self.get(id)?.root_star().filter(|&star| star != id)
    }

    /// Direct children of `id` (moons of a planet, planets of a star).
    pub fn children(&self, id: BodyId) -> impl Iterator<Item = (BodyId, &CelestialBody)> + '_ {
        self.iter().filter(move |(_, b)| b.parent == Some(id))
    }

    pub fn rings(&self) -> &[RingSystem] {
        &self.rings
    }

    /// Ring systems attached to `planet`.
    pub fn rings_of(&self, planet: BodyId) -> impl Iterator<Item = &RingSystem> + '_ {
        self.rings.iter().filter(move |r| r.planet() == planet)
    }

    /// Recompute every orbiting body's position for simulation time `t` (s).
    pub fn propagate_all(&mut self, t: f64) {
        for i in 0..self.bodies.len() {
            let (done, rest) = self.bodies.split_at_mut(i);
            let body = &mut rest[0];
            if let (Some(el), Some(parent)) = (&body.elements, body.parent) {
                body.position = propagate(el, &done[parent.0].position, t);
            }
        }
        self.time = t;
    }
}

impl Index<BodyId> for SolarSystem {
    type Output = CelestialBody;

    fn index(&self, id: BodyId) -> &CelestialBody {
        &self.bodies[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyBuilder;
    use crate::orbital::OrbitalElements;
    use nalgebra::Vector3;

    fn star() -> CelestialBody {
        BodyBuilder::new("Sun", BodyKind::Star).radius(10.0).build()
    }

    #[test]
    fn parents_must_precede_children() {
        let mut sys = SolarSystem::new();
        let planet = BodyBuilder::new("Orphan", BodyKind::Planet)
            .orbit(BodyId(3), OrbitalElements::circular(100.0, 10.0))
            .build();
        assert!(matches!(sys.add_body(planet), Err(BodyError::ParentNotLoaded { parent: 3, .. })));
    }

    #[test]
    fn invalid_elements_rejected() {
        let mut sys = SolarSystem::new();
        let sun = sys.add_body(star()).unwrap();
        let mut el = OrbitalElements::circular(100.0, 10.0);
        el.e = 1.2;
        let bad = BodyBuilder::new("Comet", BodyKind::Asteroid).orbit(sun, el).build();
        assert!(matches!(sys.add_body(bad), Err(BodyError::InvalidElements { .. })));
        assert_eq!(sys.len(), 1);
    }

    #[test]
    fn root_star_resolved_through_chain() {
        let mut sys = SolarSystem::new();
        let sun = sys.add_body(star()).unwrap();
        let earth = sys
            .add_body(
                BodyBuilder::new("Earth", BodyKind::Planet)
                    .orbit(sun, OrbitalElements::circular(1000.0, 100.0))
                    .build(),
            )
            .unwrap();
        let moon = sys
            .add_body(
                BodyBuilder::new("Moon", BodyKind::Moon)
                    .orbit(earth, OrbitalElements::circular(50.0, 10.0))
                    .build(),
            )
            .unwrap();
        assert_eq!(sys[moon].root_star(), Some(sun));
        assert_eq!(sys.light_source(moon), Some(sun));
        assert_eq!(sys.light_source(sun), None);
        assert_eq!(sys.root_star(), Some(sun));
        assert_eq!(sys.children(earth).count(), 1);
        assert_eq!(sys.find("Moon"), Some(moon));
    }

    #[test]
    fn propagate_all_follows_parents() {
        let mut sys = SolarSystem::new();
        let sun = sys.add_body(star()).unwrap();
        let earth = sys
            .add_body(
                BodyBuilder::new("Earth", BodyKind::Planet)
                    .orbit(sun, OrbitalElements::circular(1000.0, 100.0))
                    .build(),
            )
            .unwrap();
        let moon = sys
            .add_body(
                BodyBuilder::new("Moon", BodyKind::Moon)
                    .orbit(earth, OrbitalElements::circular(50.0, 10.0))
                    .build(),
            )
            .unwrap();

        sys.propagate_all(25.0);
        assert!((sys[earth].position - Vector3::new(0.0, 0.0, 1000.0)).norm() < 1e-6);
        let rel = sys[moon].position - sys[earth].position;
        assert!((rel.norm() - 50.0).abs() < 1e-6);
        assert_eq!(sys[sun].position, Vector3::zeros());
        assert_eq!(sys.time, 25.0);
    }
}
