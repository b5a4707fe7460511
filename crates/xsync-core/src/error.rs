//! Error types for xsync-core

use std::path::PathBuf;

/// Result type for xsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading mappings or reconciling a pair
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mapping spec could not be turned into a filesystem path
    #[error("Invalid path spec '{spec}': {reason}")]
    InvalidPathSpec { spec: String, reason: String },

    /// The directory that should hold the external file is absent.
    /// Usually an unmounted share; ends the whole run.
    #[error("Directory {path} does not exist")]
    MissingExternalDirectory { path: PathBuf },

    /// The copy itself failed (permissions, lock, disk full)
    #[error("Could not copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: xsync_fs::Error,
    },

    /// Reading file contents or metadata failed while comparing
    #[error("Comparison failed: {source}")]
    ComparisonIo {
        #[source]
        source: xsync_fs::Error,
    },

    /// A copy completed but the files still differ
    #[error("Files {local} and {external} were not properly synchronized")]
    PostCopyMismatch { local: PathBuf, external: PathBuf },

    /// Descriptor file does not exist
    #[error("Descriptor not found: {path}")]
    DescriptorNotFound { path: PathBuf },

    /// Descriptor exists but is not a well-formed mapping document
    #[error("Descriptor {path} has invalid XML: {message}")]
    DescriptorParse { path: PathBuf, message: String },

    /// Filesystem error from xsync-fs
    #[error(transparent)]
    Fs(#[from] xsync_fs::Error),
}

impl Error {
    pub fn invalid_spec(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPathSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error ends the whole run rather than a single pair.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingExternalDirectory { .. })
    }
}
