//! Conversion helpers over raw EXIF tag payloads.
//!
//! Tag payloads arrive as endian-dependent byte vectors; everything here
//! narrows them to the types the descriptor and GPS blocks store. A missing
//! tag is reported as [`CoreError::ExifTagNotFound`] so callers can treat it
//! as an absent optional field; a present but malformed payload is an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use little_exif::{
    exif_tag::ExifTag, metadata::Metadata, rational::uR64,
    u8conversion::U8conversion,
};

use crate::error::{CoreError, Result};

pub(crate) fn tag_value<T: U8conversion<T>>(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<T> {
    let Some(found) = metadata.get_tag(tag).next() else {
        return Err(CoreError::ExifTagNotFound);
    };
    let endian = metadata.get_endian();
    Ok(T::from_u8_vec(&found.value_as_u8_vec(&endian), &endian))
}

pub(crate) fn string_value(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<String> {
    let Some(found) = metadata.get_tag(tag).next() else {
        return Err(CoreError::ExifTagNotFound);
    };
    let endian = metadata.get_endian();
    let raw = String::from_utf8(found.value_as_u8_vec(&endian))?;
    Ok(raw.replace('\0', "").trim().to_string())
}

/// Return the first integer of the first tag present in `tags`.
///
/// Width and height live in `ImageWidth`/`ImageHeight` for TIFF-backed files
/// but in the Exif IFD (`ExifImageWidth`/`ExifImageHeight`) for most JPEGs,
/// so callers pass both and take whichever is present.
pub(crate) fn first_u32(
    metadata: &Metadata,
    tags: &[ExifTag],
) -> Result<u32> {
    for tag in tags {
        match tag_value::<Vec<u32>>(metadata, tag) {
            Ok(values) => {
                return values.first().copied().ok_or_else(|| {
                    CoreError::InvalidExifConversion(
                        "empty integer payload".to_string(),
                    )
                });
            }
            Err(CoreError::ExifTagNotFound) => continue,
            Err(err) => return Err(err),
        }
    }
    Err(CoreError::ExifTagNotFound)
}

pub(crate) fn u16_value(metadata: &Metadata, tag: &ExifTag) -> Result<u16> {
    let values = tag_value::<Vec<u16>>(metadata, tag)?;
    values.first().copied().ok_or_else(|| {
        CoreError::InvalidExifConversion("empty integer payload".to_string())
    })
}

pub(crate) fn rationals(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<Vec<uR64>> {
    tag_value::<Vec<uR64>>(metadata, tag)
}

/// A rational resolution tag rounded to whole pixels per unit.
pub(crate) fn rounded_rational(
    metadata: &Metadata,
    tag: &ExifTag,
) -> Result<u32> {
    let values = rationals(metadata, tag)?;
    let first = values.first().ok_or_else(|| {
        CoreError::InvalidExifConversion("empty rational payload".to_string())
    })?;
    Ok(ratio(first)?.round() as u32)
}

pub(crate) fn ratio(rational: &uR64) -> Result<f64> {
    if rational.denominator == 0 {
        return Err(CoreError::InvalidExifConversion(
            "zero denominator in rational".to_string(),
        ));
    }
    Ok(f64::from(rational.nominator) / f64::from(rational.denominator))
}

/// EXIF datetime tags (`CreateDate`, `DateTimeOriginal`, `ModifyDate`) use
/// colon-separated dates without a zone; they are interpreted as UTC.
pub fn parse_exif_datetime(raw: &str) -> Result<DateTime<Utc>> {
    let naive =
        NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S")?;
    Ok(naive.and_utc())
}

pub fn parse_exif_date(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw.trim(), "%Y:%m:%d")?)
}

/// GPSTimeStamp stores hour, minute, and second as three rationals; the
/// second may carry a fractional part.
pub(crate) fn time_from_rationals(parts: &[uR64]) -> Result<NaiveTime> {
    if parts.len() != 3 {
        return Err(CoreError::InvalidGpsData(format!(
            "GPS timestamp has {} components, expected 3",
            parts.len()
        )));
    }
    let hour = ratio(&parts[0])?;
    let minute = ratio(&parts[1])?;
    let second = ratio(&parts[2])?;
    let nanos = (second.fract() * 1e9).round() as u32;
    NaiveTime::from_hms_nano_opt(
        hour as u32,
        minute as u32,
        second.trunc() as u32,
        nanos,
    )
    .ok_or_else(|| {
        CoreError::InvalidGpsData("GPS timestamp out of range".to_string())
    })
}

/// Collapse a missing-tag error into `None`, keeping every other error.
pub(crate) fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CoreError::ExifTagNotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exif_datetime_as_utc() {
        let parsed = parse_exif_datetime("2024:12:27 15:58:43").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-12-27T15:58:43+00:00");
    }

    #[test]
    fn rejects_malformed_datetime() {
        assert!(matches!(
            parse_exif_datetime("2024-12-27 15:58:43"),
            Err(CoreError::TimeParse(_))
        ));
    }

    #[test]
    fn parses_gps_date_stamp() {
        let parsed = parse_exif_date("2024:10:28").unwrap();
        assert_eq!(parsed.to_string(), "2024-10-28");
    }

    #[test]
    fn ratio_rejects_zero_denominator() {
        let rational = uR64 {
            nominator: 1,
            denominator: 0,
        };
        assert!(matches!(
            ratio(&rational),
            Err(CoreError::InvalidExifConversion(_))
        ));
    }

    #[test]
    fn timestamp_keeps_fractional_seconds() {
        let parts = [
            uR64 {
                nominator: 20,
                denominator: 1,
            },
            uR64 {
                nominator: 35,
                denominator: 1,
            },
            uR64 {
                nominator: 350,
                denominator: 100,
            },
        ];
        let time = time_from_rationals(&parts).unwrap();
        assert_eq!(time.to_string(), "20:35:03.500");
    }

    #[test]
    fn timestamp_requires_three_components() {
        let parts = [uR64 {
            nominator: 1,
            denominator: 1,
        }];
        assert!(matches!(
            time_from_rationals(&parts),
            Err(CoreError::InvalidGpsData(_))
        ));
    }

    #[test]
    fn optional_maps_missing_tag_to_none() {
        assert_eq!(
            optional::<u32>(Err(CoreError::ExifTagNotFound)).unwrap(),
            None
        );
        assert_eq!(optional(Ok(7u32)).unwrap(), Some(7));
        assert!(
            optional::<u32>(Err(CoreError::InvalidGpsData("x".into())))
                .is_err()
        );
    }
}
