use std::fmt;

use serde::{Deserialize, Serialize};

pub const RANDOM_IMAGE_ENDPOINT: &str = "https://picsum.photos";
pub const RANDOM_IMAGE_WIDTH: u32 = 1920;
pub const RANDOM_IMAGE_HEIGHT: u32 = 1080;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Random { width: u32, height: u32 },
    Picked { url: String },
}

impl Default for ImageSource {
    fn default() -> Self {
        ImageSource::Random {
            width: RANDOM_IMAGE_WIDTH,
            height: RANDOM_IMAGE_HEIGHT,
        }
    }
}

impl ImageSource {
    /// URL to request; for random images the final URL is whatever the endpoint redirects to.
    pub fn request_url(&self) -> Result<String, ImageError> {
        match self {
            ImageSource::Random { width, height } => random_image_url(*width, *height),
            ImageSource::Picked { url } => validate_image_url(url),
        }
    }
}

pub fn random_image_url(width: u32, height: u32) -> Result<String, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidSize { width, height });
    }
    Ok(format!("{RANDOM_IMAGE_ENDPOINT}/{width}/{height}"))
}

pub fn validate_image_url(raw: &str) -> Result<String, ImageError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ImageError::EmptyUrl);
    }
    if url.contains(&['"', '\n', '\r'][..]) {
        return Err(ImageError::UnsupportedUrl(url.to_string()));
    }
    let lower = url.to_ascii_lowercase();
    let allowed = ["http://", "https://", "blob:", "data:image/"]
        .iter()
        .any(|prefix| lower.starts_with(prefix));
    if !allowed {
        return Err(ImageError::UnsupportedUrl(url.to_string()));
    }
    Ok(url.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    EmptyUrl,
    UnsupportedUrl(String),
    InvalidSize { width: u32, height: u32 },
    Status { code: u16 },
    Network(String),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::EmptyUrl => f.write_str("image url is empty"),
            ImageError::UnsupportedUrl(url) => write!(f, "unsupported image url: {url}"),
            ImageError::InvalidSize { width, height } => {
                write!(f, "image size must be non-zero, got {width}x{height}")
            }
            ImageError::Status { code } => write!(f, "image request failed with status {code}"),
            ImageError::Network(message) => write!(f, "image request failed: {message}"),
        }
    }
}

impl std::error::Error for ImageError {}
