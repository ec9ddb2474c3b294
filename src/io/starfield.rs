use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use super::error::{LoadError, LoadResult};

pub const STAR_MAGIC: &[u8; 4] = b"STAR";
pub const STAR_VERSION: i32 = 1;
pub const MAX_STARS: i32 = 200_000;

/// Background star catalog: unit directions, visual magnitudes and ARGB colors.
///
/// The three vectors always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarCatalog {
    pub dirs: Vec<[f32; 3]>,
    pub mags: Vec<f32>,
    pub colors: Vec<u32>,
}

impl StarCatalog {
    pub fn len(&self) -> usize {
        self.mags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mags.is_empty()
    }

    pub fn push(&mut self, dir: [f32; 3], mag: f32, argb: u32) {
        self.dirs.push(dir);
        self.mags.push(mag);
        self.colors.push(argb);
    }
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a binary `STAR` catalog (all fields little-endian).
pub fn read_catalog<R: Read>(reader: &mut R) -> LoadResult<StarCatalog> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != STAR_MAGIC {
        return Err(LoadError::BadMagic);
    }

    let version = read_i32(reader)?;
    if version != STAR_VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }

    let count = read_i32(reader)?;
    if count <= 0 || count > MAX_STARS {
        return Err(LoadError::BadStarCount(count));
    }

    let n = count as usize;
    let mut catalog = StarCatalog {
        dirs: Vec::with_capacity(n),
        mags: Vec::with_capacity(n),
        colors: Vec::with_capacity(n),
    };
    for _ in 0..n {
        let dx = read_f32(reader)?;
        let dy = read_f32(reader)?;
        let dz = read_f32(reader)?;
        let mag = read_f32(reader)?;
        let argb = read_u32(reader)?;
        catalog.push([dx, dy, dz], mag, argb);
    }
    debug!(stars = n, "star catalog loaded");
    Ok(catalog)
}

/// Write a catalog in the format [`read_catalog`] accepts.
pub fn write_catalog<W: Write>(writer: &mut W, catalog: &StarCatalog) -> io::Result<()> {
    writer.write_all(STAR_MAGIC)?;
    writer.write_all(&STAR_VERSION.to_le_bytes())?;
    writer.write_all(&(catalog.len() as i32).to_le_bytes())?;
    for i in 0..catalog.len() {
        for c in catalog.dirs[i] {
            writer.write_all(&c.to_le_bytes())?;
        }
        writer.write_all(&catalog.mags[i].to_le_bytes())?;
        writer.write_all(&catalog.colors[i].to_le_bytes())?;
    }
    Ok(())
}

pub fn read_catalog_file(path: &Path) -> LoadResult<StarCatalog> {
    let mut reader = BufReader::new(File::open(path)?);
    read_catalog(&mut reader)
}

pub fn write_catalog_file(path: &Path, catalog: &StarCatalog) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_catalog(&mut writer, catalog)?;
    writer.flush()
}
