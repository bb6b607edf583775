//! Derived metadata
//!
//! Extension-based classification and recursive size accounting.

use std::path::Path;
use walkdir::WalkDir;

/// Extensions (lowercase, without the dot) treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg"];

/// Returns true if the path's extension is a recognized image type.
/// Content is never inspected.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Sums the sizes of all regular files below `path`.
///
/// Symlinks are not followed. Entries that disappear or cannot be read
/// during the walk are left out of the total instead of failing it.
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// MIME type for serving a file inline, guessed from the extension.
pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
