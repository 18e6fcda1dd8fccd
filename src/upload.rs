//! Image files for product uploads

use mime::Mime;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Largest image the API accepts
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Name of the multipart field the API reads the image from
pub const IMAGE_FIELD: &str = "image";

/// An image stored by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub key: String,
    pub filename: String,
}

/// `data` of `POST /upload/image`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageEnvelope {
    pub image: UploadedImage,
}

/// A validated image ready to be uploaded
#[derive(Debug, Clone)]
pub struct ImageFile {
    filename: String,
    content_type: Mime,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Wrap in-memory image data.
    ///
    /// Fails unless `content_type` is an `image/*` type and the data is no
    /// larger than [`MAX_IMAGE_SIZE`].
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>, content_type: Mime) -> Result<Self> {
        if content_type.type_() != mime::IMAGE {
            return Err(Error::invalid_image("Please select an image file"));
        }
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(Error::invalid_image("File size must be less than 5MB"));
        }
        Ok(Self {
            filename: filename.into(),
            content_type,
            bytes,
        })
    }

    /// Read an image from disk, taking the content type from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content_type = content_type_for(path)
            .ok_or_else(|| Error::invalid_image("Please select an image file"))?;

        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > MAX_IMAGE_SIZE as u64 {
            return Err(Error::invalid_image("File size must be less than 5MB"));
        }

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Self::new(filename, bytes, content_type)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multipart form with the image under the `image` field
    pub(crate) fn into_form(self) -> Result<Form> {
        let part = Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(self.content_type.as_ref())?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

/// Image content type for a file extension
pub fn content_type_for(path: &Path) -> Option<Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().ok()?,
        "avif" => "image/avif".parse().ok()?,
        _ => return None,
    };
    Some(mime)
}
