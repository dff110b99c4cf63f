//! Release archive extraction.

mod tar_gz;

pub use tar_gz::TarGzExtractor;
