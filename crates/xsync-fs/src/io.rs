//! Atomic copy operations with file locking

use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning for lock acquisition and durability of writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a held `<target>.lock` before giving up.
    pub lock_timeout: Duration,
    /// Flush file contents to disk before the rename.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Copy `src` over `dst` atomically, creating or replacing `dst`.
///
/// The bytes are streamed into a temp file next to `dst` (same filesystem)
/// while an advisory lock on `<dst>.lock` is held, then renamed into place.
/// Missing parent directories of `dst` are created. When `preserve_mtime`
/// is set the source's modification time is carried over. An existing
/// `dst` keeps its permissions; a read-only one is not overwritten.
///
/// Returns the number of bytes copied.
pub fn copy_atomic(
    src: &NormalizedPath,
    dst: &NormalizedPath,
    config: RobustnessConfig,
    preserve_mtime: bool,
) -> Result<u64> {
    let src_path = src.to_native();
    let dst_path = dst.to_native();

    let mut source = File::open(&src_path).map_err(|e| Error::io(&src_path, e))?;
    let source_mtime = if preserve_mtime {
        Some(
            source
                .metadata()
                .and_then(|m| m.modified())
                .map_err(|e| Error::io(&src_path, e))?,
        )
    } else {
        None
    };

    if let Some(parent) = dst_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock_path = lock_path_for(&dst_path);
    let lock = acquire_lock(&lock_path, &dst_path, config)?;

    let temp_path = temp_path_for(&dst_path);
    let result = writable_target(&dst_path).and_then(|permissions| {
        let copied = write_temp(&mut source, &temp_path, source_mtime, permissions, config)?;
        fs::rename(&temp_path, &dst_path).map_err(|e| Error::io(&dst_path, e))?;
        Ok(copied)
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    // Closing the handle releases the lock
    drop(lock);
    let _ = fs::remove_file(&lock_path);

    if let Ok(copied) = result {
        tracing::debug!(
            src = %src_path.display(),
            dst = %dst_path.display(),
            bytes = copied,
            "Copied file"
        );
    }
    result
}

/// Permissions of an existing `dst`, or `None` when it does not exist yet.
///
/// A read-only `dst` is refused rather than replaced by the rename.
fn writable_target(dst: &Path) -> Result<Option<Permissions>> {
    match fs::metadata(dst) {
        Ok(metadata) if metadata.permissions().readonly() => Err(Error::io(
            dst,
            io::Error::new(io::ErrorKind::PermissionDenied, "destination is read-only"),
        )),
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(dst, e)),
    }
}

fn write_temp(
    source: &mut File,
    temp_path: &Path,
    mtime: Option<SystemTime>,
    permissions: Option<Permissions>,
    config: RobustnessConfig,
) -> Result<u64> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    let copied = io::copy(source, &mut temp_file).map_err(|e| Error::io(temp_path, e))?;
    temp_file.flush().map_err(|e| Error::io(temp_path, e))?;

    if let Some(mtime) = mtime {
        temp_file
            .set_modified(mtime)
            .map_err(|e| Error::io(temp_path, e))?;
    }

    if let Some(permissions) = permissions {
        temp_file
            .set_permissions(permissions)
            .map_err(|e| Error::io(temp_path, e))?;
    }

    if config.enable_fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }

    Ok(copied)
}

/// Take an exclusive advisory lock, retrying with backoff until the
/// configured timeout elapses.
fn acquire_lock(lock_path: &Path, target: &Path, config: RobustnessConfig) -> Result<File> {
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| Error::io(lock_path, e))?;

    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(config.lock_timeout),
        ..Default::default()
    };

    backoff::retry(policy, || {
        lock_file
            .try_lock_exclusive()
            .map_err(backoff::Error::transient)
    })
    .map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(lock_file)
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    target.with_file_name(temp_name)
}

/// Last modification time of a file.
pub fn modified_time(path: &NormalizedPath) -> Result<SystemTime> {
    let native_path = path.to_native();
    fs::metadata(&native_path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(&native_path, e))
}

/// Read the raw bytes of a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}
