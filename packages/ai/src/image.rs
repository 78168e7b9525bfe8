//! Image sources and loading.
//!
//! Uploads stay in memory; nothing is written to a temporary file.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine as _;

use crate::AiError;

/// Accepted image file extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// MIME type assumed for URLs whose type cannot be determined.
const FALLBACK_MIME: &str = "image/jpeg";

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A local file.
    Path(PathBuf),
    /// A remote image fetched over HTTP(S).
    Url(String),
    /// Bytes uploaded by a client.
    Upload {
        /// Original filename, used for the type check.
        filename: String,
        /// Image contents.
        bytes: Vec<u8>,
    },
}

/// An image ready to send to a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// MIME type, e.g. `image/png`.
    pub mime_type: &'static str,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl LoadedImage {
    /// Base64 encoding of the bytes.
    #[must_use]
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// A `data:` URL embedding the image.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

/// Maps a file extension to its MIME type.
#[must_use]
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

fn mime_for_name(name: &str) -> Result<&'static str, AiError> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
        .ok_or_else(|| AiError::UnsupportedImage {
            message: format!(
                "{name}: expected one of {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        })
}

/// Guesses the MIME type of a URL from its path, ignoring query and
/// fragment.
fn mime_for_url(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    Path::new(last_segment)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension)
}

impl ImageSource {
    /// Interprets user input: `http://` and `https://` are URLs, anything
    /// else is a local path.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// A short human-readable description (path, URL, or upload name).
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::Upload { filename, .. } => filename.clone(),
        }
    }

    /// Loads the image bytes.
    ///
    /// # Errors
    ///
    /// * [`AiError::UnsupportedImage`] if a file or upload does not have a
    ///   supported extension, or the image is empty
    /// * [`AiError::Io`] if a local file cannot be read
    /// * [`AiError::Http`] if a URL cannot be fetched
    pub async fn load(&self, client: &reqwest::Client) -> Result<LoadedImage, AiError> {
        let image = match self {
            Self::Path(path) => {
                let mime_type = mime_for_name(&path.to_string_lossy())?;
                let bytes = tokio::fs::read(path).await?;
                LoadedImage { mime_type, bytes }
            }
            Self::Upload { filename, bytes } => LoadedImage {
                mime_type: mime_for_name(filename)?,
                bytes: bytes.clone(),
            },
            Self::Url(url) => {
                log::debug!("Fetching image from {url}");
                let resp = client.get(url).send().await?.error_for_status()?;
                let header_mime = resp
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(';').next())
                    .and_then(|v| v.trim().strip_prefix("image/"))
                    .and_then(mime_for_extension);
                let mime_type = mime_for_url(url)
                    .or(header_mime)
                    .unwrap_or(FALLBACK_MIME);
                let bytes = resp.bytes().await?.to_vec();
                LoadedImage { mime_type, bytes }
            }
        };

        if image.bytes.is_empty() {
            return Err(AiError::UnsupportedImage {
                message: format!("{} is empty", self.describe()),
            });
        }

        log::debug!(
            "Loaded {} ({}, {} bytes)",
            self.describe(),
            image.mime_type,
            image.bytes.len()
        );

        Ok(image)
    }
}
