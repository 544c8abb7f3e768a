//! Upload sources and progress reporting.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};

use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;

/// Receives upload progress as a percentage, 0 to 100.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Body bytes handed to the transport per step; progress is reported as
/// each step is consumed.
pub const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

/// A file staged for upload.
#[derive(Debug, Clone)]
pub struct UploadSource {
    /// File name sent to the server.
    pub name: String,
    /// Declared content type. The server guesses from the name when unset.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

impl UploadSource {
    /// Wraps in-memory content.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    /// Sets the declared content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Reads a file from disk, naming it after the last path component and
    /// guessing its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation(format!("No file name in {}", path.display())))?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorKind::NotFound
            } else {
                ErrorKind::Storage
            };
            AppError::with_source(kind, format!("Failed to read {}", path.display()), e)
        })?;

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string());

        Ok(Self {
            name,
            mime_type,
            data: Bytes::from(data),
        })
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Splits the content into a body stream that reports progress as the
    /// transport pulls each chunk.
    pub fn progress_stream(
        &self,
        progress: ProgressFn,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
        let data = self.data.clone();
        let total = data.len();
        let chunks: Vec<Bytes> = (0..total)
            .step_by(PROGRESS_CHUNK_BYTES)
            .map(|start| data.slice(start..(start + PROGRESS_CHUNK_BYTES).min(total)))
            .collect();

        let mut sent = 0usize;
        stream::iter(chunks).map(move |chunk| {
            sent += chunk.len();
            progress(percent(sent as u64, total as u64));
            Ok(chunk)
        })
    }
}

/// Integer percentage of `done` over `total`; an empty total is complete.
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
    }

    #[tokio::test]
    async fn test_progress_stream_reports_each_chunk() {
        let source = UploadSource::new("big.bin", vec![7u8; PROGRESS_CHUNK_BYTES * 2 + 10]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Arc::new(move |p| sink.lock().unwrap().push(p));

        let chunks: Vec<Bytes> = source
            .progress_stream(progress)
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), source.data.len());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        tokio::fs::write(&path, b"%PDF").await.unwrap();

        let source = UploadSource::from_path(&path).await.unwrap();
        assert_eq!(source.name, "report.pdf");
        assert_eq!(source.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(source.size(), 4);

        let err = UploadSource::from_path(dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
