//! The CV attached to every message of a batch.

/// Decoded attachment bytes plus the filename they are sent under.
///
/// Decoded once per batch and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// MIME type derived from the filename extension.
    pub fn content_type(&self) -> &'static str {
        let extension = std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
