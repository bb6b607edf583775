//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::path::PathBuf;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// Present for regular files only
    pub size: Option<u64>,
}

/// Result of a properties lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileProperties {
    pub name: String,
    pub path: PathBuf,
    /// Recursive total for directories
    pub size: u64,
    pub is_dir: bool,
    pub is_image: bool,
    /// Direct retrieval URL for image files, empty otherwise
    pub url: String,
}

/// A single upload payload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Why one file of an upload batch was not stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub message: String,
}

/// Per-file outcome of an upload batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Sanitized names of the files that were written
    pub saved: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Located file ready to be streamed back
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    pub file_path: PathBuf,
    pub file_name: String,
    pub size: u64,
}
