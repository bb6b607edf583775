//! Storage operations
//!
//! Filesystem operations behind the file manager: list, upload, retrieve,
//! rename, delete, move, mkdir and properties. Every path argument goes
//! through [`SandboxRoot::resolve`] before the filesystem is touched.
//! Authorization is not checked here; see [`crate::service::FileManager`].

use log::{info, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::storage::metadata::{directory_size, is_image};
use crate::storage::resolver::SandboxRoot;
use crate::storage::results::{
    DirectoryEntry, FileProperties, RetrieveResult, UploadFailure, UploadFile, UploadReport,
};
use crate::storage::sanitize::sanitize_name;

/// Characters left unescaped in a URL path segment
const URL_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Distinguishes temporary upload files written concurrently
static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lists the immediate children of a directory, in filesystem order.
pub fn list_directory(root: &SandboxRoot, dir: &str) -> Result<Vec<DirectoryEntry>, StorageError> {
    let dir_path = root.resolve(dir)?;
    if !dir_path.is_dir() {
        return Err(StorageError::NotFound(dir.to_string()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir_path).map_err(|e| not_found_or_io(e, dir))? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", root.relative_display(&dir_path), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let (is_dir, size) = match entry_metadata(root, &entry.path()) {
            Some(metadata) => (metadata.is_dir(), metadata.is_file().then(|| metadata.len())),
            None => (false, None),
        };

        entries.push(DirectoryEntry { name, is_dir, size });
    }

    info!(
        "Listed directory {} - {} entries",
        root.relative_display(&dir_path),
        entries.len()
    );

    Ok(entries)
}

/// Metadata for a listed entry. Symlinks are followed only when their
/// target stays inside the root; anything else reports no metadata.
fn entry_metadata(root: &SandboxRoot, path: &Path) -> Option<fs::Metadata> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if !metadata.file_type().is_symlink() {
        return Some(metadata);
    }
    match path.canonicalize() {
        Ok(real) if real.starts_with(root.path()) => fs::metadata(&real).ok(),
        _ => None,
    }
}

/// Stores uploaded files into a directory, creating it if missing.
///
/// Each file is handled independently: a file whose name sanitizes to
/// nothing, or whose write fails, is recorded in the report and the batch
/// carries on. Existing files with the same sanitized name are replaced.
pub fn upload_files(
    root: &SandboxRoot,
    dir: &str,
    files: Vec<UploadFile>,
) -> Result<UploadReport, StorageError> {
    let dir_path = root.resolve(dir)?;
    if dir_path.exists() && !dir_path.is_dir() {
        return Err(StorageError::InvalidInput(format!(
            "Not a directory: {}",
            dir
        )));
    }
    fs::create_dir_all(&dir_path)?;

    let mut report = UploadReport::default();
    for file in files {
        let Some(name) = sanitize_name(&file.filename) else {
            report.failed.push(UploadFailure {
                filename: file.filename,
                message: "Invalid filename".into(),
            });
            continue;
        };

        let target = dir_path.join(&name);
        if target.is_dir() {
            report.failed.push(UploadFailure {
                filename: file.filename,
                message: format!("A directory named {} already exists", name),
            });
            continue;
        }

        match store_file(&target, &file.data) {
            Ok(()) => {
                info!(
                    "Stored upload {} ({} bytes)",
                    root.relative_display(&target),
                    file.data.len()
                );
                report.saved.push(name);
            }
            Err(e) => {
                warn!("Failed to store upload {}: {}", root.relative_display(&target), e);
                report.failed.push(UploadFailure {
                    filename: file.filename,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Writes `data` next to `target` under a short temporary name, then renames
/// it into place so readers never observe a half-written file.
fn store_file(target: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = target.with_file_name(format!(
        ".upload-{}-{}.part",
        process::id(),
        UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| {
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.flush()?;
        drop(temp_file);
        fs::rename(&temp_path, target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Locates an existing regular file for download or inline serving.
pub fn prepare_file_retrieval(
    root: &SandboxRoot,
    file: &str,
) -> Result<RetrieveResult, StorageError> {
    let file_path = root.resolve(file)?;
    let metadata = fs::metadata(&file_path).map_err(|e| not_found_or_io(e, file))?;
    if !metadata.is_file() {
        return Err(StorageError::NotFound(file.to_string()));
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!("Prepared file retrieval for {}", root.relative_display(&file_path));

    Ok(RetrieveResult {
        file_path,
        file_name,
        size: metadata.len(),
    })
}

/// Renames an entry in place. `new_name` is a name, not a path: it is
/// sanitized, so any separators it carries are flattened and the result
/// always lands beside the original.
pub fn rename_entry(
    root: &SandboxRoot,
    old_path: &str,
    new_name: &str,
) -> Result<PathBuf, StorageError> {
    let old = root.resolve(old_path)?;
    if old == root.path() {
        return Err(StorageError::InvalidInput("Cannot rename the root".into()));
    }
    if fs::symlink_metadata(&old).is_err() {
        return Err(StorageError::NotFound(old_path.to_string()));
    }

    let name = sanitize_name(new_name)
        .ok_or_else(|| StorageError::InvalidInput("Invalid name".into()))?;
    let parent = old
        .parent()
        .ok_or_else(|| StorageError::InvalidInput("Cannot rename the root".into()))?;
    let new = parent.join(name);

    fs::rename(&old, &new).map_err(|e| not_found_or_io(e, old_path))?;

    info!(
        "Renamed {} to {}",
        root.relative_display(&old),
        root.relative_display(&new)
    );
    Ok(new)
}

/// Deletes a file, or a directory with everything below it.
/// Symlinks are removed themselves, never followed.
pub fn delete_entry(root: &SandboxRoot, path: &str) -> Result<(), StorageError> {
    let target = root.resolve(path)?;
    if target == root.path() {
        return Err(StorageError::InvalidInput("Cannot delete the root".into()));
    }

    let metadata = fs::symlink_metadata(&target).map_err(|e| not_found_or_io(e, path))?;
    if metadata.is_dir() {
        fs::remove_dir_all(&target).map_err(|e| not_found_or_io(e, path))?;
    } else {
        fs::remove_file(&target).map_err(|e| not_found_or_io(e, path))?;
    }

    info!("Deleted {}", root.relative_display(&target));
    Ok(())
}

/// Moves a file or directory into `dest_dir`, keeping its base name.
/// The destination directory is created if missing.
pub fn move_entry(
    root: &SandboxRoot,
    src_path: &str,
    dest_dir: &str,
) -> Result<PathBuf, StorageError> {
    let src = root.resolve(src_path)?;
    let dest = root.resolve(dest_dir)?;

    if src == root.path() {
        return Err(StorageError::InvalidInput("Cannot move the root".into()));
    }
    if dest.starts_with(&src) || real_path(&dest).starts_with(real_entry_path(&src)) {
        return Err(StorageError::InvalidInput(
            "Cannot move a directory into itself".into(),
        ));
    }
    if dest.exists() && !dest.is_dir() {
        return Err(StorageError::InvalidInput(format!(
            "Not a directory: {}",
            dest_dir
        )));
    }
    fs::create_dir_all(&dest)?;

    if fs::symlink_metadata(&src).is_err() {
        return Err(StorageError::NotFound(src_path.to_string()));
    }

    let name = src
        .file_name()
        .ok_or_else(|| StorageError::InvalidInput("Cannot move the root".into()))?;
    let target = dest.join(name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(StorageError::AlreadyExists(root.relative_display(&target)));
    }

    match fs::rename(&src, &target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_recursive(&src, &target)?;
            if src.is_dir() {
                fs::remove_dir_all(&src)?;
            } else {
                fs::remove_file(&src)?;
            }
        }
        Err(e) => return Err(not_found_or_io(e, src_path)),
    }

    info!(
        "Moved {} to {}",
        root.relative_display(&src),
        root.relative_display(&target)
    );
    Ok(target)
}

/// `path` with symlinks resolved along its existing prefix. Components that
/// do not exist yet are appended unchanged.
fn real_path(path: &Path) -> PathBuf {
    let mut base = path;
    let mut rest: Vec<&OsStr> = Vec::new();
    loop {
        if let Ok(real) = base.canonicalize() {
            return rest.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        match (base.parent(), base.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                base = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Like [`real_path`], but leaves the final component alone so a symlink
/// names itself rather than its target.
fn real_entry_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => real_path(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Copies a file or directory tree. Symlinks are skipped.
fn copy_recursive(src: &Path, target: &Path) -> Result<(), StorageError> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| StorageError::InvalidInput("Walk left the source tree".into()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination)?;
        } else {
            warn!("Skipping symlink during copy: {}", entry.path().display());
        }
    }
    Ok(())
}

/// Creates `name` inside `parent`, along with any missing ancestors.
///
/// `name` must be a single component: separators are rejected outright
/// rather than flattened, and a name that sanitizes to nothing is refused.
pub fn make_directory(
    root: &SandboxRoot,
    parent: &str,
    name: &str,
) -> Result<PathBuf, StorageError> {
    if name.contains(['/', '\\']) {
        return Err(StorageError::InvalidInput("Invalid directory name".into()));
    }
    let name = sanitize_name(name)
        .ok_or_else(|| StorageError::InvalidInput("Invalid directory name".into()))?;

    let target = root.resolve(parent)?.join(name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(StorageError::AlreadyExists(root.relative_display(&target)));
    }

    fs::create_dir_all(&target)?;

    info!("Created directory {}", root.relative_display(&target));
    Ok(target)
}

/// Reports name, absolute path, size, kind and, for images, a retrieval
/// URL under `url_base` built from the entry's root-relative path.
pub fn entry_properties(
    root: &SandboxRoot,
    path: &str,
    url_base: &str,
) -> Result<FileProperties, StorageError> {
    let target = root.resolve(path)?;
    let metadata = fs::metadata(&target).map_err(|e| not_found_or_io(e, path))?;

    let is_dir = metadata.is_dir();
    let size = if is_dir {
        directory_size(&target)
    } else {
        metadata.len()
    };
    let is_image = !is_dir && is_image(&target);
    let url = if is_image {
        let relative = target
            .strip_prefix(root.path())
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_default();
        file_url(url_base, &relative)
    } else {
        String::new()
    };

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileProperties {
        name,
        path: target,
        size,
        is_dir,
        is_image,
        url,
    })
}

/// `{url_base}/files/{path}` with each path segment percent-encoded.
pub fn file_url(url_base: &str, relative_path: &str) -> String {
    let segments: Vec<String> = relative_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(|segment| utf8_percent_encode(segment, URL_SEGMENT).to_string())
        .collect();

    format!("{}/files/{}", url_base.trim_end_matches('/'), segments.join("/"))
}

fn not_found_or_io(e: io::Error, path: &str) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::IoError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_encodes_segments() {
        assert_eq!(
            file_url("/filemanager", "photos/cat.png"),
            "/filemanager/files/photos/cat.png"
        );
        assert_eq!(
            file_url("/filemanager/", "/my photos/a#1.png"),
            "/filemanager/files/my%20photos/a%231.png"
        );
        assert_eq!(
            file_url("/fm", "a\\.\\b.svg"),
            "/fm/files/a/b.svg"
        );
    }
}
