//! Module `service`
//!
//! The gated operation surface of the file manager. Each method first asks
//! the [`Authorizer`] with an explicit [`AuthContext`], and only then hands
//! the untrusted path arguments to the storage layer, which confines them to
//! the root before touching the filesystem.

use log::warn;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{AllowAll, AuthContext, Authorizer, Caller, Operation};
use crate::error::{AuthError, FileManagerError};
use crate::storage::operations;
use crate::storage::{
    DirectoryEntry, FileProperties, RetrieveResult, SandboxRoot, UploadFile, UploadReport,
};

/// Holds no mutable state; clones share the authorizer.
#[derive(Clone)]
pub struct FileManager {
    root: SandboxRoot,
    authorizer: Arc<dyn Authorizer>,
    url_base: String,
}

impl FileManager {
    pub fn new(root: SandboxRoot, authorizer: Arc<dyn Authorizer>, url_base: &str) -> Self {
        Self {
            root,
            authorizer,
            url_base: url_base.trim_end_matches('/').to_string(),
        }
    }

    /// A file manager that lets every caller do everything.
    pub fn unrestricted(root: SandboxRoot, url_base: &str) -> Self {
        Self::new(root, Arc::new(AllowAll), url_base)
    }

    pub fn root(&self) -> &SandboxRoot {
        &self.root
    }

    pub fn url_base(&self) -> &str {
        &self.url_base
    }

    fn authorize(
        &self,
        caller: &Caller,
        operation: Operation,
        target: &str,
    ) -> Result<(), FileManagerError> {
        let ctx = AuthContext {
            caller,
            operation,
            target,
        };
        if self.authorizer.authorize(&ctx) {
            Ok(())
        } else {
            warn!(
                "Refused {} for {}",
                operation,
                caller.username().unwrap_or("anonymous")
            );
            Err(AuthError::Unauthorized(operation).into())
        }
    }

    pub fn list(&self, caller: &Caller, dir: &str) -> Result<Vec<DirectoryEntry>, FileManagerError> {
        self.authorize(caller, Operation::List, dir)?;
        Ok(operations::list_directory(&self.root, dir)?)
    }

    pub fn upload(
        &self,
        caller: &Caller,
        dir: &str,
        files: Vec<UploadFile>,
    ) -> Result<UploadReport, FileManagerError> {
        self.authorize(caller, Operation::Upload, dir)?;
        Ok(operations::upload_files(&self.root, dir, files)?)
    }

    pub fn download(&self, caller: &Caller, file: &str) -> Result<RetrieveResult, FileManagerError> {
        self.authorize(caller, Operation::Download, file)?;
        Ok(operations::prepare_file_retrieval(&self.root, file)?)
    }

    pub fn rename(
        &self,
        caller: &Caller,
        old_path: &str,
        new_name: &str,
    ) -> Result<PathBuf, FileManagerError> {
        self.authorize(caller, Operation::Rename, old_path)?;
        Ok(operations::rename_entry(&self.root, old_path, new_name)?)
    }

    pub fn delete(&self, caller: &Caller, path: &str) -> Result<(), FileManagerError> {
        self.authorize(caller, Operation::Delete, path)?;
        Ok(operations::delete_entry(&self.root, path)?)
    }

    /// Authorizes against the source path.
    pub fn move_entry(
        &self,
        caller: &Caller,
        src_path: &str,
        dest_dir: &str,
    ) -> Result<PathBuf, FileManagerError> {
        self.authorize(caller, Operation::Move, src_path)?;
        Ok(operations::move_entry(&self.root, src_path, dest_dir)?)
    }

    pub fn mkdir(
        &self,
        caller: &Caller,
        dir_path: &str,
        dir_name: &str,
    ) -> Result<PathBuf, FileManagerError> {
        self.authorize(caller, Operation::Mkdir, dir_path)?;
        Ok(operations::make_directory(&self.root, dir_path, dir_name)?)
    }

    pub fn properties(&self, caller: &Caller, path: &str) -> Result<FileProperties, FileManagerError> {
        self.authorize(caller, Operation::Properties, path)?;
        Ok(operations::entry_properties(&self.root, path, &self.url_base)?)
    }

    pub fn serve_file(&self, caller: &Caller, filename: &str) -> Result<RetrieveResult, FileManagerError> {
        self.authorize(caller, Operation::ServeFile, filename)?;
        Ok(operations::prepare_file_retrieval(&self.root, filename)?)
    }
}
