use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::render::framebuffer::FrameBuffer;

/// Write the frame as a binary (P6) PPM image. Labels are not rasterized.
pub fn write_ppm<W: Write>(writer: &mut W, fb: &FrameBuffer) -> io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", fb.width(), fb.height())?;
    writer.write_all(&fb.to_rgb_bytes())
}

pub fn write_ppm_file(path: &Path, fb: &FrameBuffer) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ppm(&mut writer, fb)?;
    writer.flush()
}
