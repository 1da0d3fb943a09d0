//! EXIF metadata extraction.
//!
//! [`ImageMetadata::read_from_path`] is the entry point: it parses the EXIF
//! payload once and assembles the descriptor and (when present) GPS block
//! from it.

pub mod descriptor;
pub mod exif;
pub mod gps;

use std::path::{Path, PathBuf};

use little_exif::metadata::Metadata;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use descriptor::{Descriptor, Orientation};
pub use gps::{GpsCoord, GpsData};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub path: PathBuf,
    pub descriptor: Descriptor,
    pub gps: Option<GpsData>,
}

impl ImageMetadata {
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = Metadata::new_from_path(path)?;
        Self::from_exif(path, &metadata)
    }

    /// Images without a GPS IFD get `gps: None` rather than an empty block.
    pub fn from_exif(path: &Path, metadata: &Metadata) -> Result<Self> {
        let descriptor = Descriptor::from_exif(metadata)?;
        let gps = {
            let block = GpsData::from_exif(metadata)?;
            (!block.is_empty()).then_some(block)
        };
        Ok(ImageMetadata {
            path: path.to_path_buf(),
            descriptor,
            gps,
        })
    }
}
