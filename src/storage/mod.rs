//! File system storage management
//!
//! Path confinement, name sanitization, metadata, and the filesystem
//! operations built on top of them.

pub mod metadata;
pub mod operations;
pub mod resolver;
pub mod results;
pub mod sanitize;

pub use resolver::{SandboxRoot, resolve_within};
pub use results::{DirectoryEntry, FileProperties, RetrieveResult, UploadFailure, UploadFile, UploadReport};
pub use sanitize::sanitize_name;
