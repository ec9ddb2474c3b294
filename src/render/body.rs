use super::framebuffer::FrameBuffer;
use super::RenderContext;
use crate::body::{BodyId, CelestialBody, SolarSystem};
use crate::camera::{Camera, ScreenPoint};
use crate::math::EPSILON;

/// What [`render_body`] ended up drawing, mostly for tests and frame stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDraw {
    Skipped,
    Icon,
    Subpixel,
    FlatDisk,
    Shaded,
}

/// Rasterize one body.
///
/// Bodies below one pixel become an icon or a faded dot (overlay policy
/// permitting). Larger bodies lit by a star are shaded per scanline segment
/// with a camera-space ray–sphere hit; unlit bodies and stars are flat disks.
pub fn render_body(
    system: &SolarSystem,
    id: BodyId,
    camera: &Camera,
    ctx: &RenderContext<'_>,
    fb: &mut FrameBuffer,
) -> BodyDraw {
    let Some(body) = system.get(id) else { return BodyDraw::Skipped };
    let Some(center) = camera.project(&body.position) else { return BodyDraw::Skipped };

    if camera.distance_to(&body.position) <= body.radius * ctx.config.surface_safety {
        return BodyDraw::Skipped;
    }

    let r = camera.apparent_pixel_radius_from(&body.position, body.radius, &center);
    let (w, h) = (camera.width() as f64, camera.height() as f64);
    if center.x + r < 0.0 || center.x - r > w || center.y + r < 0.0 || center.y - r > h {
        return BodyDraw::Skipped;
    }

    let overlay = ctx.overlay;
    let drawn = if r < 1.0 {
        let alpha = overlay.alpha(system, id, r);
        if !overlay.approves(system, id) || alpha <= 0.0 {
            return BodyDraw::Skipped;
        }
        let caps = body.capabilities();
        if overlay.config.show_icons && caps.icon_fallback {
            fb.draw_circle(center.x, center.y, caps.icon_px, body.color(), alpha);
            BodyDraw::Icon
        } else {
            draw_subpixel(body, &center, r, alpha, ctx.config.subpixel_min_alpha, fb);
            BodyDraw::Subpixel
        }
    } else {
        match system.light_source(id).and_then(|s| system.get(s)) {
            Some(star) => {
                draw_shaded(body, star, &center, r, camera, ctx, fb);
                BodyDraw::Shaded
            }
            None => {
                fb.fill_disk(center.x, center.y, r, body.color());
                BodyDraw::FlatDisk
            }
        }
    };

    overlay.label(system, id, camera, &center, r, fb);
    drawn
}

/// One dot whose opacity and brightness follow the disk's fractional area.
fn draw_subpixel(body: &CelestialBody, at: &ScreenPoint, r: f64, overlay_alpha: f64, min_alpha: f64, fb: &mut FrameBuffer) {
    let coverage = (std::f64::consts::PI * r * r).min(1.0);
    let alpha = (min_alpha + (1.0 - min_alpha) * coverage) * overlay_alpha;
    let (x, y) = at.pixel();
    fb.blend(x, y, body.color().scaled(coverage), alpha);
}

fn draw_shaded(
    body: &CelestialBody,
    star: &CelestialBody,
    center: &ScreenPoint,
    r: f64,
    camera: &Camera,
    ctx: &RenderContext<'_>,
    fb: &mut FrameBuffer,
) {
    let cam_center = camera.world_to_camera(&body.position);
    let to_star = star.position - body.position;
    let light = camera.direction_to_camera(&(to_star / to_star.norm().max(EPSILON)));
    let solar = ctx.lighting.solar_illumination(&body.position, &star.position);

    let radius2 = body.radius * body.radius;
    let c2 = cam_center.norm_squared();
    let shade = body.shade();

    let r_pix = r.ceil().max(1.0) as i64;
    let (cx, cy) = center.pixel();
    let (w, h) = (camera.width() as i64, camera.height() as i64);
    let segments = ctx.config.segments.max(1) as i64;

    let dy_min = (-r_pix).max(-cy);
    let dy_max = r_pix.min(h - 1 - cy);

    for dy in dy_min..=dy_max {
        let sy = dy as f64 / r_pix as f64;
        let x_sq = 1.0 - sy * sy;
        if x_sq <= 0.0 {
            continue;
        }
        let half = (x_sq.sqrt() * r_pix as f64) as i64;
        let y = cy + dy;
        let (x_start, x_end) = (cx - half, cx + half);
        if x_end < 0 || x_start > w - 1 {
            continue;
        }
        let x_min = x_start.max(0);
        let x_max = x_end.min(w - 1);
        let width = x_max - x_min + 1;
        if width <= 0 {
            continue;
        }
        let step = (width / segments).max(1);

        let mut next = x_min;
        while next <= x_max {
            let x = next;
            let x2 = x_max.min(x + step - 1);
            let mid = (x + x2) / 2;
            next += step;

            let sx = (mid - cx) as f64 / r_pix as f64;
            if sx * sx + sy * sy > 1.0 {
                continue;
            }

            let ray = camera.pixel_ray(mid as f64, y as f64);
            let b = ray.dot(&cam_center);
            let disc = b * b - (c2 - radius2);
            if disc <= 0.0 {
                continue;
            }
            let t_hit = b - disc.sqrt();
            if t_hit <= 0.0 {
                continue;
            }
            let normal = ray * t_hit - cam_center;
            let normal = normal / normal.norm().max(EPSILON);

            let lambert = normal.dot(&light).max(0.0);
            let intensity = ctx.lighting.planet_intensity(lambert, solar);
            fb.fill_span(y, x, x2, shade.shade(intensity));
        }
    }
}
