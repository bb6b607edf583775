//! Path confinement
//!
//! Turns untrusted client path strings into absolute paths that are
//! guaranteed to stay inside the file root.

use log::info;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// The immutable root every client path is confined to.
///
/// The root is canonicalized once when opened, so it carries no trailing
/// separator, no `.`/`..` segments and no symlinks. Cloning is cheap enough
/// to hand one to every component that needs it.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    /// Opens `path` as a sandbox root, creating the directory if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let root = path.canonicalize()?;
        if !root.is_dir() {
            return Err(StorageError::InvalidInput(
                "file root is not a directory".into(),
            ));
        }

        info!("File root: {}", root.display());
        Ok(Self { root })
    }

    /// Absolute, canonical root path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves a client path to an absolute path inside the root.
    ///
    /// Performs the lexical confinement of [`resolve_within`], then checks
    /// that no symlink on the way to the candidate leads outside the root.
    pub fn resolve(&self, input: &str) -> Result<PathBuf, StorageError> {
        let candidate = resolve_within(&self.root, input)?;
        self.ensure_no_symlink_escape(&candidate)?;
        Ok(candidate)
    }

    /// Root-relative display form of a resolved path, used for logging.
    pub fn relative_display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
            Ok(rel) => format!("/{}", rel.to_string_lossy()),
            Err(_) => "<outside root>".to_string(),
        }
    }

    /// Canonicalizes the deepest existing ancestor of `candidate` and
    /// requires it to still lie under the root. Dangling symlinks are
    /// refused outright since writing through one would land wherever it
    /// points.
    fn ensure_no_symlink_escape(&self, candidate: &Path) -> Result<(), StorageError> {
        let mut probe = candidate;
        loop {
            match fs::symlink_metadata(probe) {
                Ok(_) => break,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                    ) =>
                {
                    if probe == self.root {
                        return Ok(());
                    }
                    match probe.parent() {
                        Some(parent) => probe = parent,
                        None => return Ok(()),
                    }
                }
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }

        let real = probe
            .canonicalize()
            .map_err(|_| StorageError::AccessDenied)?;
        if real.starts_with(&self.root) {
            Ok(())
        } else {
            Err(StorageError::AccessDenied)
        }
    }
}

/// Lexically resolves `input` against `root` without touching the filesystem.
///
/// Rules:
/// - `\` is treated as a separator, repeated separators and `.` collapse
/// - trailing separators are ignored; an input of only separators is the root
/// - an input starting with a separator is a host-absolute path and is
///   accepted only if it already lies inside the root
/// - `..` is applied to the *joined* path, then the result must be the root
///   or a descendant of it, compared component by component so that
///   `/srv/filesx` never passes for `/srv/files`
///
/// Any violation is `AccessDenied`.
pub fn resolve_within(root: &Path, input: &str) -> Result<PathBuf, StorageError> {
    if !root.is_absolute() {
        return Err(StorageError::InvalidInput(
            "file root must be an absolute path".into(),
        ));
    }
    if input.contains('\0') {
        return Err(StorageError::AccessDenied);
    }

    let unified = input.replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(root.to_path_buf());
    }

    let mut resolved = if trimmed.starts_with('/') {
        PathBuf::from("/")
    } else {
        root.to_path_buf()
    };

    for segment in trimmed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            name => {
                // Anything that is not a single plain name (a drive prefix on
                // Windows, for instance) would replace the path on push.
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => resolved.push(name),
                    _ => return Err(StorageError::AccessDenied),
                }
            }
        }
    }

    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(StorageError::AccessDenied)
    }
}
