//! Filesystem layer for xsync
//!
//! Provides normalized path handling, streaming byte-exact comparison and
//! locked atomic copies used by the reconciliation engine.

pub mod compare;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use compare::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, files_equal, streams_equal};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
