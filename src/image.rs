//! IIIF Image API request paths for full-frame, unrotated derivatives.

use std::fmt;

/// Output format. Anything other than the well-known three is passed to the
/// image server verbatim; the server decides whether it is supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Jpg,
    Tif,
    Png,
    Other(String),
}

impl ImageFormat {
    /// Used both as the request's `default.{ext}` and the output file extension.
    pub fn extension(&self) -> &str {
        match self {
            Self::Jpg => "jpg",
            Self::Tif => "tif",
            Self::Png => "png",
            Self::Other(ext) => ext,
        }
    }
}

impl From<&str> for ImageFormat {
    fn from(raw: &str) -> Self {
        match raw {
            "jpg" => Self::Jpg,
            "tif" => Self::Tif,
            "png" => Self::Png,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Bounding box for the requested derivative; `None` leaves a side unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeSpec {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl SizeSpec {
    pub fn new(max_width: Option<u32>, max_height: Option<u32>) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// The IIIF `size` path segment.
    pub fn token(&self) -> String {
        match (self.max_width, self.max_height) {
            (Some(w), Some(h)) => format!("!{w},{h}"),
            (Some(w), None) => format!("{w},"),
            (None, Some(h)) => format!(",{h}"),
            (None, None) => "max".to_owned(),
        }
    }
}

pub fn build_image_url(service_id: &str, format: &ImageFormat, size: SizeSpec) -> String {
    let service_id = service_id.trim_end_matches('/');
    format!(
        "{service_id}/full/{size}/0/default.{ext}",
        size = size.token(),
        ext = format.extension()
    )
}
