use super::color::Rgb;

/// Text the host draws on top of the frame (the core never rasterizes glyphs).
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: i64,
    pub y: i64,
    pub alpha: f64,
}

/// Quantize an alpha in [0, 1] to one of 256 composite levels.
pub fn alpha_level(alpha: f64) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

// ---------------------------------------------------------------------------
// Frame buffer
// ---------------------------------------------------------------------------

/// Software render target: `0x00RRGGBB` pixels, row-major, plus overlay text.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    pub labels: Vec<Label>,
    pub hud: Vec<String>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
            labels: Vec::new(),
            hud: Vec::new(),
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height];
        }
    }

    /// Fill with `color` and drop last frame's overlay text.
    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color.packed());
        self.labels.clear();
        self.hud.clear();
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Rgb> {
        self.index(x, y).map(|i| Rgb::from_packed(self.pixels[i]))
    }

    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.packed();
        }
    }

    /// Source-over composite at one of 256 alpha levels.
    pub fn blend_level(&mut self, x: i64, y: i64, color: Rgb, level: u8) {
        let Some(i) = self.index(x, y) else { return };
        match level {
            0 => {}
            255 => self.pixels[i] = color.packed(),
            a => {
                let dst = Rgb::from_packed(self.pixels[i]);
                let a = a as u32;
                let ch = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
                self.pixels[i] = Rgb::new(ch(color.r, dst.r), ch(color.g, dst.g), ch(color.b, dst.b)).packed();
            }
        }
    }

    pub fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f64) {
        self.blend_level(x, y, color, alpha_level(alpha));
    }

    /// Opaque horizontal span [x0, x1] on row `y`, clipped.
    pub fn fill_span(&mut self, y: i64, x0: i64, x1: i64, color: Rgb) {
        if y < 0 || y >= self.height as i64 || x1 < x0 {
            return;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width as i64 - 1);
        if x1 < x0 {
            return;
        }
        let row = y as usize * self.width;
        self.pixels[row + x0 as usize..=row + x1 as usize].fill(color.packed());
    }

    /// Flat disk of radius `r` pixels centered at (`cx`, `cy`).
    pub fn fill_disk(&mut self, cx: f64, cy: f64, r: f64, color: Rgb) {
        let (cxi, cyi) = (cx.round() as i64, cy.round() as i64);
        let rr = r.ceil() as i64;
        let y0 = (-rr).max(-cyi);
        let y1 = rr.min(self.height as i64 - 1 - cyi);
        for dy in y0..=y1 {
            let sy = dy as f64;
            let half2 = r * r - sy * sy;
            if half2 < 0.0 {
                continue;
            }
            let half = half2.sqrt() as i64;
            self.fill_span(cyi + dy, cxi - half, cxi + half, color);
        }
    }

    /// Bresenham line between sub-pixel endpoints, each pixel composited at
    /// `alpha`. The segment is clipped to the viewport first, so the walk is
    /// bounded by the viewport size however far off screen the endpoints are.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb, alpha: f64) {
        let level = alpha_level(alpha);
        if level == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip_segment(x0, y0, x1, y1) else {
            return;
        };
        let (x0, y0, x1, y1) = (x0.round() as i64, y0.round() as i64, x1.round() as i64, y1.round() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.blend_level(x, y, color, level);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Liang-Barsky clip against the pixel-center box of the viewport.
    fn clip_segment(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(f64, f64, f64, f64)> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) || self.width == 0 || self.height == 0 {
            return None;
        }
        let (xmax, ymax) = (self.width as f64 - 1.0, self.height as f64 - 1.0);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        Some((x0 + t0 * dx, y0 + t0 * dy, x0 + t1 * dx, y0 + t1 * dy))
    }

    /// Midpoint circle outline of `diameter` pixels around (`cx`, `cy`).
    pub fn draw_circle(&mut self, cx: f64, cy: f64, diameter: u32, color: Rgb, alpha: f64) {
        let level = alpha_level(alpha);
        let (cx, cy) = (cx.round() as i64, cy.round() as i64);
        let r = (diameter / 2) as i64;
        if r == 0 {
            self.blend_level(cx, cy, color, level);
            return;
        }
        let (mut x, mut y, mut d) = (r, 0i64, 1 - r);
        while x >= y {
            for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.blend_level(cx + px, cy + py, color, level);
            }
            y += 1;
            if d < 0 {
                d += 2 * y + 1;
            } else {
                x -= 1;
                d += 2 * (y - x) + 1;
            }
        }
    }

    pub fn push_label(&mut self, text: impl Into<String>, x: i64, y: i64, alpha: f64) {
        self.labels.push(Label { text: text.into(), x, y, alpha });
    }

    /// Packed RGB bytes, row-major (for PPM output).
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            let c = Rgb::from_packed(p);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }

    /// Opaque RGBA bytes, row-major (for texture upload).
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let c = Rgb::from_packed(p);
            out.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
        out
    }

    pub fn count_lit(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.set(-1, 0, Rgb::WHITE);
        fb.set(4, 0, Rgb::WHITE);
        fb.blend(0, 3, Rgb::WHITE, 1.0);
        fb.fill_span(1, -10, -1, Rgb::WHITE);
        assert_eq!(fb.count_lit(), 0);
    }

    #[test]
    fn blend_levels() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.blend(0, 0, Rgb::WHITE, 0.5);
        assert_eq!(fb.get(0, 0), Some(Rgb::gray(128)));
        fb.blend(1, 0, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(1, 0), Some(Rgb::WHITE));
        fb.blend(1, 0, Rgb::BLACK, 0.0);
        assert_eq!(fb.get(1, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn span_is_clipped() {
        let mut fb = FrameBuffer::new(5, 2);
        fb.fill_span(0, -3, 2, Rgb::new(1, 2, 3));
        assert_eq!(fb.count_lit(), 3);
        fb.fill_span(1, 3, 99, Rgb::new(1, 2, 3));
        assert_eq!(fb.count_lit(), 5);
    }

    #[test]
    fn line_touches_endpoints() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_line(1.0, 1.0, 8.0, 5.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(1, 1), Some(Rgb::WHITE));
        assert_eq!(fb.get(8, 5), Some(Rgb::WHITE));
    }

    #[test]
    fn far_off_screen_line_is_clipped_to_viewport() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_line(-1.0e12, 5.0, 1.0e12, 5.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.count_lit(), 10);
        for x in 0..10 {
            assert_eq!(fb.get(x, 5), Some(Rgb::WHITE), "x={}", x);
        }

        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_line(-8.0e8, -3.0e8, 4.0, 4.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(4, 4), Some(Rgb::WHITE));
        assert!(fb.count_lit() <= 10, "lit {}", fb.count_lit());
    }

    #[test]
    fn line_missing_viewport_or_non_finite_draws_nothing() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_line(-50.0, 20.0, 20.0, -50.0, Rgb::WHITE, 1.0);
        fb.draw_line(f64::NAN, 1.0, 5.0, 5.0, Rgb::WHITE, 1.0);
        fb.draw_line(1.0, 1.0, f64::INFINITY, 5.0, Rgb::WHITE, 1.0);
        assert_eq!(fb.count_lit(), 0);
    }

    #[test]
    fn disk_and_circle() {
        let mut fb = FrameBuffer::new(21, 21);
        fb.fill_disk(10.0, 10.0, 5.0, Rgb::WHITE);
        assert_eq!(fb.get(10, 10), Some(Rgb::WHITE));
        assert_eq!(fb.get(10, 15), Some(Rgb::WHITE));
        assert_eq!(fb.get(0, 0), Some(Rgb::BLACK));

        let mut fb = FrameBuffer::new(21, 21);
        fb.draw_circle(10.0, 10.0, 12, Rgb::WHITE, 1.0);
        assert_eq!(fb.get(16, 10), Some(Rgb::WHITE));
        assert_eq!(fb.get(10, 10), Some(Rgb::BLACK));
    }

    #[test]
    fn clear_drops_labels() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.push_label("Earth", 1, 1, 1.0);
        fb.hud.push("hud".into());
        fb.clear(Rgb::BLACK);
        assert!(fb.labels.is_empty() && fb.hud.is_empty());
    }
}
