use serde::{Deserialize, Serialize};

/// A file part taken from the multipart form. Lives only as long as the request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl UploadedImage {
    pub fn new(data: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: Some(content_type.into()),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unnamed>")
    }
}

/// Inline image reference: a `data:<media>;base64,` URL on the way out, or any
/// accepted URL coming back from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePart {
    pub url: String,
}

/// Form fields as received, before any validation.
#[derive(Debug, Clone, Default)]
pub struct GenerateForm {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub images: Vec<UploadedImage>,
}

/// A validated request: trimmed non-empty prompt, allow-listed model, at least one image.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model_id: String,
    pub images: Vec<UploadedImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub images: Vec<String>,
}

/// Where the inbound request says it came from; feeds the attribution referer.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub origin: Option<String>,
    pub referer: Option<String>,
}
