use chrono::{NaiveDate, NaiveTime};
use little_exif::{
    exif_tag::ExifTag, metadata::Metadata, rational::uR64,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::metadata::exif;

/// A degrees/minutes/seconds coordinate as stored in the GPS IFD.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoord {
    pub deg: u32,
    pub min: u32,
    pub sec: f64,
}

impl GpsCoord {
    /// Unsigned decimal degrees; the hemisphere sign comes from the
    /// matching reference tag.
    pub fn to_decimal(&self) -> f64 {
        f64::from(self.deg) + f64::from(self.min) / 60.0 + self.sec / 3600.0
    }
}

/// GPS block of an image, straight from the GPS IFD.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsData {
    pub latitude_ref: Option<String>,
    pub latitude: Option<GpsCoord>,
    pub longitude_ref: Option<String>,
    pub longitude: Option<GpsCoord>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

impl GpsData {
    pub fn from_exif(metadata: &Metadata) -> Result<Self> {
        let latitude_ref = exif::optional(exif::string_value(
            metadata,
            &ExifTag::GPSLatitudeRef(String::new()),
        ))?
        .filter(|value| !value.is_empty());
        let latitude = coord_field(
            metadata,
            &ExifTag::GPSLatitude(Vec::new()),
        )?;
        let longitude_ref = exif::optional(exif::string_value(
            metadata,
            &ExifTag::GPSLongitudeRef(String::new()),
        ))?
        .filter(|value| !value.is_empty());
        let longitude = coord_field(
            metadata,
            &ExifTag::GPSLongitude(Vec::new()),
        )?;
        let time = match exif::optional(exif::rationals(
            metadata,
            &ExifTag::GPSTimeStamp(Vec::new()),
        ))? {
            Some(parts) => Some(exif::time_from_rationals(&parts)?),
            None => None,
        };
        let date = match exif::optional(exif::string_value(
            metadata,
            &ExifTag::GPSDateStamp(String::new()),
        ))? {
            Some(raw) if !raw.is_empty() => {
                Some(exif::parse_exif_date(&raw)?)
            }
            _ => None,
        };

        Ok(GpsData {
            latitude_ref,
            latitude,
            longitude_ref,
            longitude,
            date,
            time,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.latitude_ref.is_none()
            && self.longitude_ref.is_none()
            && self.date.is_none()
            && self.time.is_none()
    }

    /// Signed `(latitude, longitude)` in decimal degrees, suitable for a
    /// geography point. `None` unless both coordinates are present.
    pub fn decimal_position(&self) -> Option<(f64, f64)> {
        let latitude = self.latitude?;
        let longitude = self.longitude?;
        let lat_sign = hemisphere_sign(self.latitude_ref.as_deref(), 'S');
        let lon_sign = hemisphere_sign(self.longitude_ref.as_deref(), 'W');
        Some((
            lat_sign * latitude.to_decimal(),
            lon_sign * longitude.to_decimal(),
        ))
    }
}

fn hemisphere_sign(reference: Option<&str>, negative: char) -> f64 {
    match reference.and_then(|value| value.trim().chars().next()) {
        Some(first) if first.eq_ignore_ascii_case(&negative) => -1.0,
        _ => 1.0,
    }
}

fn coord_field(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<Option<GpsCoord>> {
    match exif::optional(exif::rationals(metadata, tag))? {
        Some(parts) => Ok(Some(coord_from_rationals(&parts)?)),
        None => Ok(None),
    }
}

fn coord_from_rationals(parts: &[uR64]) -> Result<GpsCoord> {
    if parts.len() != 3 {
        return Err(CoreError::InvalidGpsData(format!(
            "GPS coordinate has {} components, expected 3",
            parts.len()
        )));
    }
    let deg = exif::ratio(&parts[0])
        .map_err(|_| zero_denominator("degrees"))?;
    let min = exif::ratio(&parts[1])
        .map_err(|_| zero_denominator("minutes"))?;
    let sec = exif::ratio(&parts[2])
        .map_err(|_| zero_denominator("seconds"))?;
    Ok(GpsCoord {
        deg: deg as u32,
        min: min as u32,
        sec,
    })
}

fn zero_denominator(component: &str) -> CoreError {
    CoreError::InvalidGpsData(format!(
        "zero denominator in GPS {component}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(nominator: u32, denominator: u32) -> uR64 {
        uR64 {
            nominator,
            denominator,
        }
    }

    #[test]
    fn converts_dms_to_decimal() {
        let coord = coord_from_rationals(&[
            rational(45, 1),
            rational(45, 1),
            rational(3705, 100),
        ])
        .unwrap();
        assert_eq!(coord.deg, 45);
        assert_eq!(coord.min, 45);
        assert_eq!(coord.sec, 37.05);
        assert!((coord.to_decimal() - 45.760_291_6).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_component_count() {
        assert!(matches!(
            coord_from_rationals(&[rational(45, 1)]),
            Err(CoreError::InvalidGpsData(_))
        ));
    }

    #[test]
    fn rejects_zero_denominator() {
        assert!(matches!(
            coord_from_rationals(&[
                rational(45, 0),
                rational(45, 1),
                rational(0, 1),
            ]),
            Err(CoreError::InvalidGpsData(_))
        ));
    }

    #[test]
    fn southern_and_western_hemispheres_are_negative() {
        let gps = GpsData {
            latitude_ref: Some("S".to_string()),
            latitude: Some(GpsCoord {
                deg: 33,
                min: 51,
                sec: 0.0,
            }),
            longitude_ref: Some("W".to_string()),
            longitude: Some(GpsCoord {
                deg: 70,
                min: 40,
                sec: 0.0,
            }),
            ..GpsData::default()
        };
        let (lat, lon) = gps.decimal_position().unwrap();
        assert!(lat < 0.0);
        assert!(lon < 0.0);
    }

    #[test]
    fn missing_reference_defaults_to_positive() {
        let gps = GpsData {
            latitude: Some(GpsCoord {
                deg: 45,
                min: 0,
                sec: 0.0,
            }),
            longitude: Some(GpsCoord {
                deg: 4,
                min: 0,
                sec: 0.0,
            }),
            ..GpsData::default()
        };
        let (lat, lon) = gps.decimal_position().unwrap();
        assert_eq!(lat, 45.0);
        assert_eq!(lon, 4.0);
    }

    #[test]
    fn position_requires_both_coordinates() {
        let gps = GpsData {
            latitude: Some(GpsCoord::default()),
            ..GpsData::default()
        };
        assert_eq!(gps.decimal_position(), None);
    }

    #[test]
    fn empty_block_reports_empty() {
        assert!(GpsData::default().is_empty());
        let gps = GpsData {
            date: Some(NaiveDate::from_ymd_opt(2024, 10, 28).unwrap()),
            ..GpsData::default()
        };
        assert!(!gps.is_empty());
    }
}
