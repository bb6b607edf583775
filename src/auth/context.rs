//! Module `context`
//!
//! The information handed to an authorizer for each operation.

use std::fmt;

/// Operations exposed by the file manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Upload,
    Download,
    Rename,
    Delete,
    Move,
    Mkdir,
    Properties,
    ServeFile,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::Rename => "rename",
            Operation::Delete => "delete",
            Operation::Move => "move",
            Operation::Mkdir => "mkdir",
            Operation::Properties => "properties",
            Operation::ServeFile => "serve_file",
        }
    }

    /// Whether the operation changes the filesystem
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::Upload
                | Operation::Rename
                | Operation::Delete
                | Operation::Move
                | Operation::Mkdir
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of whoever issued a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    username: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }
}

/// Everything an authorizer may base its decision on.
///
/// `target` is the client-supplied path exactly as received. It has not
/// been resolved yet, since authorization runs before any path handling.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext<'a> {
    pub caller: &'a Caller,
    pub operation: Operation,
    pub target: &'a str,
}
