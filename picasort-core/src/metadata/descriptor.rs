use chrono::{DateTime, Utc};
use little_exif::{exif_tag::ExifTag, metadata::Metadata};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metadata::exif;

/// The eight EXIF orientation codes plus a catch-all for values outside the
/// standard range.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlippedHorizontally = 2,
    Rotated180Deg = 3,
    FlippedVertically = 4,
    Transposed = 5,
    Rotated90DegCw = 6,
    Transverse = 7,
    Rotated90DegCcw = 8,
    Unknown = 9,
}

impl Orientation {
    pub fn from_code(code: u16) -> Orientation {
        match code {
            1 => Orientation::Normal,
            2 => Orientation::FlippedHorizontally,
            3 => Orientation::Rotated180Deg,
            4 => Orientation::FlippedVertically,
            5 => Orientation::Transposed,
            6 => Orientation::Rotated90DegCw,
            7 => Orientation::Transverse,
            8 => Orientation::Rotated90DegCcw,
            _ => Orientation::Unknown,
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether rendering swaps the pixel grid's width and height.
    pub fn transposes_dimensions(&self) -> bool {
        matches!(
            self,
            Orientation::Transposed
                | Orientation::Rotated90DegCw
                | Orientation::Transverse
                | Orientation::Rotated90DegCcw
        )
    }
}

/// Per-image descriptor assembled from EXIF.
///
/// Every field is optional: images stripped of metadata still index, they
/// just carry less.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
    pub resolution_x: Option<u32>,
    pub resolution_y: Option<u32>,
    pub resolution_unit: Option<u16>,
    pub orientation: Option<Orientation>,
    pub creation_date: Option<DateTime<Utc>>,
    pub original_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
    pub copyright: Option<String>,
}

impl Descriptor {
    pub fn from_exif(metadata: &Metadata) -> Result<Self> {
        let width = exif::optional(exif::first_u32(
            metadata,
            &[
                ExifTag::ImageWidth(Vec::new()),
                ExifTag::ExifImageWidth(Vec::new()),
            ],
        ))?;
        let height = exif::optional(exif::first_u32(
            metadata,
            &[
                ExifTag::ImageHeight(Vec::new()),
                ExifTag::ExifImageHeight(Vec::new()),
            ],
        ))?;
        let description = exif::optional(exif::string_value(
            metadata,
            &ExifTag::ImageDescription(String::new()),
        ))?
        .filter(|value| !value.is_empty());
        let resolution_x = exif::optional(exif::rounded_rational(
            metadata,
            &ExifTag::XResolution(Vec::new()),
        ))?;
        let resolution_y = exif::optional(exif::rounded_rational(
            metadata,
            &ExifTag::YResolution(Vec::new()),
        ))?;
        let resolution_unit = exif::optional(exif::u16_value(
            metadata,
            &ExifTag::ResolutionUnit(Vec::new()),
        ))?;
        let orientation = exif::optional(exif::u16_value(
            metadata,
            &ExifTag::Orientation(Vec::new()),
        ))?
        .map(Orientation::from_code);
        let creation_date = datetime_field(
            metadata,
            &ExifTag::CreateDate(String::new()),
        )?;
        let original_date = datetime_field(
            metadata,
            &ExifTag::DateTimeOriginal(String::new()),
        )?;
        let modification_date =
            datetime_field(metadata, &ExifTag::ModifyDate(String::new()))?;
        let copyright = exif::optional(exif::string_value(
            metadata,
            &ExifTag::Copyright(String::new()),
        ))?
        .filter(|value| !value.is_empty());

        Ok(Descriptor {
            width,
            height,
            description,
            resolution_x,
            resolution_y,
            resolution_unit,
            orientation,
            creation_date,
            original_date,
            modification_date,
            copyright,
        })
    }
}

fn datetime_field(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<Option<DateTime<Utc>>> {
    match exif::optional(exif::string_value(metadata, tag))? {
        Some(raw) if !raw.is_empty() => {
            Ok(Some(exif::parse_exif_datetime(&raw)?))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_codes_round_trip() {
        for code in 1..=8u16 {
            assert_eq!(Orientation::from_code(code).code(), code);
        }
    }

    #[test]
    fn out_of_range_orientation_is_unknown() {
        assert_eq!(Orientation::from_code(0), Orientation::Unknown);
        assert_eq!(Orientation::from_code(42), Orientation::Unknown);
    }

    #[test]
    fn rotated_orientations_transpose_dimensions() {
        assert!(Orientation::Rotated90DegCw.transposes_dimensions());
        assert!(Orientation::Rotated90DegCcw.transposes_dimensions());
        assert!(!Orientation::Normal.transposes_dimensions());
        assert!(!Orientation::Rotated180Deg.transposes_dimensions());
    }

    #[test]
    fn default_descriptor_is_all_absent() {
        let descriptor = Descriptor::default();
        assert_eq!(descriptor.width, None);
        assert_eq!(descriptor.orientation, None);
        assert_eq!(descriptor.copyright, None);
    }
}
