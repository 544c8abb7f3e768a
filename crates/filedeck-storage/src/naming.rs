//! Storage path assignment for uploaded content.

use std::path::Path;

use uuid::Uuid;

/// Longest stem kept from the uploaded name.
const MAX_STEM_CHARS: usize = 64;

/// Build a fresh storage path `<stem>-<uuid>.<ext>` for an uploaded file.
///
/// The stem keeps ASCII alphanumerics, `-` and `_` from the original name;
/// everything else becomes `_`. The random UUID makes every call unique.
pub fn storage_path_for(original_name: &str) -> String {
    let path = Path::new(original_name);
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .take(MAX_STEM_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "file".to_string() } else { stem };

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{stem}-{}.{ext}", Uuid::new_v4()),
        None => format!("{stem}-{}", Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_stem_and_extension() {
        let path = storage_path_for("Annual Report.PDF");
        assert!(path.starts_with("Annual_Report-"));
        assert!(path.ends_with(".pdf"));
    }

    #[test]
    fn test_paths_are_unique() {
        assert_ne!(storage_path_for("a.txt"), storage_path_for("a.txt"));
    }

    #[test]
    fn test_strips_directories_and_odd_names() {
        let path = storage_path_for("../../etc/passwd");
        assert!(path.starts_with("passwd-"));
        assert!(!path.contains('/'));

        assert!(storage_path_for(".").starts_with("file-"));
    }
}
