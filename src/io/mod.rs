pub mod error;
pub mod ppm;
pub mod starfield;
pub mod system_file;

pub use error::{LoadError, LoadResult};
pub use ppm::{write_ppm, write_ppm_file};
pub use starfield::{read_catalog, read_catalog_file, write_catalog, write_catalog_file, StarCatalog};
pub use system_file::{load_system, load_system_file, save_system, save_system_file, LoaderConfig};
