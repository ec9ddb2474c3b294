/// 8-bit sRGB color as stored in save files and the shade tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// From a packed `0x??RRGGBB` word; the top byte is ignored.
    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Packed `0x00RRGGBB`, the frame buffer pixel layout.
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Multiply each channel by `k` (clamped to [0, 1]), truncating.
    pub fn scaled(self, k: f64) -> Self {
        let k = k.clamp(0.0, 1.0);
        Self {
            r: (self.r as f64 * k) as u8,
            g: (self.g as f64 * k) as u8,
            b: (self.b as f64 * k) as u8,
        }
    }

    /// Linear interpolation toward `other`, rounded per channel.
    pub fn mix(self, other: Rgb, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
        }
    }
}
