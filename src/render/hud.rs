use nalgebra::Vector3;

use crate::body::{BodyId, BodyKind, SolarSystem};
use crate::orbital::SECONDS_PER_DAY;

/// How long (real seconds) the nearest-body panel stays up after a request.
pub const INFO_HUD_DURATION: f64 = 30.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Format a number with three significant digits, switching to exponent
/// form for very large or very small magnitudes.
pub fn sig3(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{:.2}", v);
    }
    let exp = v.abs().log10().floor() as i32;
    if !(-4..3).contains(&exp) {
        format!("{:.2e}", v)
    } else {
        format!("{:.*}", (2 - exp) as usize, v)
    }
}

/// Human-readable simulation rate, e.g. `3.50 days/sec`.
pub fn format_sim_speed(sim_seconds_per_second: f64) -> String {
    let sec = sim_seconds_per_second;
    if sec < 120.0 {
        return format!("{:.2} seconds/sec", sec);
    }
    let minutes = sec / 60.0;
    if minutes < 120.0 {
        return format!("{:.2} minutes/sec", minutes);
    }
    let hours = minutes / 60.0;
    if hours < 48.0 {
        return format!("{:.2} hours/sec", hours);
    }
    let days = hours / 24.0;
    if days < 365.0 {
        return format!("{:.2} days/sec", days);
    }
    format!("{:.2} years/sec", days / DAYS_PER_YEAR)
}

/// The two always-on status lines: simulation rate and camera speed.
pub fn status_lines(display_speed: f64, speed_level: i32, camera_speed: f64, km_per_unit: f64) -> Vec<String> {
    vec![
        format!("Sim Speed: {}", format_sim_speed(display_speed)),
        format!(
            "Speed: base * 2^{}  ({} km/s)",
            speed_level,
            sig3(camera_speed * km_per_unit)
        ),
    ]
}

/// Closest non-star body to `camera_pos`.
pub fn nearest_body(system: &SolarSystem, camera_pos: &Vector3<f64>) -> Option<BodyId> {
    system
        .iter()
        .filter(|(_, b)| b.kind != BodyKind::Star)
        .map(|(id, b)| (id, (b.position - camera_pos).norm_squared()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Detail panel for one body, as shown after a "nearest body" request.
pub fn body_info_lines(
    system: &SolarSystem,
    id: BodyId,
    camera_pos: &Vector3<f64>,
    km_per_unit: f64,
) -> Vec<String> {
    let Some(body) = system.get(id) else { return Vec::new() };
    let dist = (body.position - camera_pos).norm();

    let mut lines = vec![
        format!("Nearest: {} ({})", body.name, body.kind),
        format!(
            "Distance from camera: {} units  (~{} km)",
            sig3(dist),
            sig3(dist * km_per_unit)
        ),
        format!(
            "Radius: {} units  (~{} km)",
            sig3(body.radius),
            sig3(body.radius * km_per_unit)
        ),
    ];

    if let Some(el) = &body.elements {
        let parent = body.parent.and_then(|p| system.get(p));
        let days = el.period / SECONDS_PER_DAY;
        lines.push(format!("Orbits: {}", parent.map_or("None", |p| p.name.as_str())));
        lines.push(format!("Eccentricity: {:.4}", el.e));
        lines.push(format!(
            "Orbital period: {} days  ({} years)",
            sig3(days),
            sig3(days / DAYS_PER_YEAR)
        ));
        if let Some(p) = parent {
            let pd = (body.position - p.position).norm();
            lines.push(format!(
                "Current distance to parent: {} units  (~{} km)",
                sig3(pd),
                sig3(pd * km_per_unit)
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::presets;

    #[test]
    fn sim_speed_units() {
        assert_eq!(format_sim_speed(1.0), "1.00 seconds/sec");
        assert_eq!(format_sim_speed(119.0), "119.00 seconds/sec");
        assert_eq!(format_sim_speed(600.0), "10.00 minutes/sec");
        assert_eq!(format_sim_speed(3.0 * 3600.0), "3.00 hours/sec");
        assert_eq!(format_sim_speed(10.0 * 86_400.0), "10.00 days/sec");
        assert_eq!(format_sim_speed(2.0 * 365.25 * 86_400.0), "2.00 years/sec");
    }

    #[test]
    fn three_significant_digits() {
        assert_eq!(sig3(1.0), "1.00");
        assert_eq!(sig3(12.345), "12.3");
        assert_eq!(sig3(999.0), "999");
        assert_eq!(sig3(0.05), "0.0500");
        assert_eq!(sig3(1_496_000.0), "1.50e6");
        assert_eq!(sig3(0.0), "0.00");
    }

    #[test]
    fn status_reports_camera_speed() {
        let lines = status_lines(60.0, 3, 4000.0, 100.0);
        assert_eq!(lines[0], "Sim Speed: 60.00 seconds/sec");
        assert_eq!(lines[1], "Speed: base * 2^3  (4.00e5 km/s)");
    }

    #[test]
    fn nearest_skips_stars() {
        let sys = presets::sun_earth_moon().unwrap();
        let sun = sys.find("Sun").unwrap();
        assert_ne!(nearest_body(&sys, &sys[sun].position), Some(sun));

        let moon = sys.find("Moon").unwrap();
        let near_moon = sys[moon].position + Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(nearest_body(&sys, &near_moon), Some(moon));
    }

    #[test]
    fn info_names_parent_and_period() {
        let sys = presets::sun_earth_moon().unwrap();
        let moon = sys.find("Moon").unwrap();
        let lines = body_info_lines(&sys, moon, &Vector3::zeros(), 100.0);
        assert_eq!(lines[0], "Nearest: Moon (moon)");
        assert!(lines.iter().any(|l| l == "Orbits: Earth"));
        assert!(lines.iter().any(|l| l.starts_with("Orbital period: 27.3 days")));
        assert_eq!(lines.len(), 7);

        let sun = sys.find("Sun").unwrap();
        assert_eq!(body_info_lines(&sys, sun, &Vector3::zeros(), 100.0).len(), 3);
    }
}
