use nalgebra::Vector3;

use crate::body::{BodyId, SolarSystem};

/// Stable insertion sort of `(id, distance)` pairs by ascending distance.
///
/// Frame-to-frame order barely changes, so the list is nearly sorted and
/// insertion sort stays close to linear.
pub fn sort_by_distance(items: &mut [(BodyId, f64)]) {
    for i in 1..items.len() {
        let key = items[i];
        let mut j = i;
        while j > 0 && items[j - 1].1 > key.1 {
            items[j] = items[j - 1];
            j -= 1;
        }
        items[j] = key;
    }
}

/// All bodies ordered nearest first. Painters walk it in reverse.
pub fn draw_order(system: &SolarSystem, camera_pos: &Vector3<f64>) -> Vec<(BodyId, f64)> {
    let mut items: Vec<(BodyId, f64)> = system
        .iter()
        .map(|(id, b)| (id, (b.position - camera_pos).norm()))
        .collect();
    sort_by_distance(&mut items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_and_stable() {
        let mut items = vec![
            (BodyId(0), 5.0),
            (BodyId(1), 1.0),
            (BodyId(2), 5.0),
            (BodyId(3), 0.5),
            (BodyId(4), 5.0),
            (BodyId(5), 3.0),
        ];
        sort_by_distance(&mut items);
        assert!(items.windows(2).all(|w| w[0].1 <= w[1].1));
        let ties: Vec<usize> = items.iter().filter(|(_, d)| *d == 5.0).map(|(id, _)| id.0).collect();
        assert_eq!(ties, vec![0, 2, 4]);
        assert_eq!(items[0].0, BodyId(3));
    }

    #[test]
    fn empty_and_single() {
        let mut none: Vec<(BodyId, f64)> = vec![];
        sort_by_distance(&mut none);
        let mut one = vec![(BodyId(9), 2.0)];
        sort_by_distance(&mut one);
        assert_eq!(one, vec![(BodyId(9), 2.0)]);
    }

    #[test]
    fn draw_order_uses_camera_distance() {
        let sys = crate::body::presets::sun_earth_moon().unwrap();
        let earth = sys.find("Earth").unwrap();
        let cam = sys[earth].position + Vector3::new(0.0, 50.0, 0.0);
        let order = draw_order(&sys, &cam);
        assert_eq!(order.len(), sys.len());
        assert_eq!(order[0].0, earth);
        assert!(order.windows(2).all(|w| w[0].1 <= w[1].1));
    }
}
