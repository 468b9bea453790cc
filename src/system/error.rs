use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("access denied for pid {0}")]
    AccessDenied(u32),

    #[error("pid {0} not found")]
    NotFound(u32),

    #[error("enumeration failed: {0}")]
    Enumeration(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, CollectError>;

impl CollectError {
    /// Classify an I/O failure while reading one entity's attributes.
    pub fn for_entity(pid: u32, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => CollectError::AccessDenied(pid),
            io::ErrorKind::NotFound => CollectError::NotFound(pid),
            _ => CollectError::Io {
                context: format!("reading pid {pid}"),
                source: err,
            },
        }
    }

    pub fn io<S: Into<String>>(context: S, source: io::Error) -> Self {
        CollectError::Io {
            context: context.into(),
            source,
        }
    }

    /// Per-entity failures degrade one row; everything else degrades the pass.
    pub fn is_per_entity(&self) -> bool {
        matches!(
            self,
            CollectError::AccessDenied(_) | CollectError::NotFound(_)
        )
    }
}
