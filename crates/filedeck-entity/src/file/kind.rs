//! File kind classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse content category derived from a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// `image/*`.
    Image,
    /// `video/*`.
    Video,
    /// `audio/*`.
    Audio,
    /// PDFs and office formats.
    Document,
    /// `text/*`.
    Text,
    /// Anything else.
    Other,
}

/// MIME fragments that mark office-style documents.
const DOCUMENT_MARKERS: &[&str] = &[
    "pdf",
    "word",
    "excel",
    "powerpoint",
    "spreadsheet",
    "presentation",
    "opendocument",
];

impl FileKind {
    /// Classify a MIME type.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.starts_with("text/") {
            Self::Text
        } else if DOCUMENT_MARKERS.iter().any(|m| mime.contains(m)) {
            Self::Document
        } else {
            Self::Other
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = filedeck_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            "text" => Ok(Self::Text),
            "other" => Ok(Self::Other),
            _ => Err(filedeck_core::AppError::validation(format!(
                "Invalid file kind: '{s}'. Expected one of: image, video, audio, document, text, other"
            ))),
        }
    }
}

/// Resolve the MIME type for an upload, guessing from the file name when
/// the client did not send one.
pub fn resolve_mime(file_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string(),
    }
}
