use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid GPS data: {0}")]
    InvalidGpsData(String),

    #[error("invalid EXIF conversion: {0}")]
    InvalidExifConversion(String),

    #[error("EXIF tag not found")]
    ExifTagNotFound,

    #[error("time parse error: {0}")]
    TimeParse(#[from] chrono::ParseError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Conversion(#[from] std::string::FromUtf8Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
