//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Mapping specs are authored on one platform and resolved on another, so
/// backslashes are converted to forward slashes and `.`/`..` segments are
/// folded lexically. Conversion to the platform-native form happens only at
/// I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// An absolute segment replaces the current path, matching
    /// [`Path::join`].
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if split_prefix(&segment_normalized).1 {
            return Self {
                inner: clean(&segment_normalized),
            };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let (prefix, _) = split_prefix(&self.inner);
        let rest = &self.inner[prefix.len()..];
        if rest.is_empty() || rest == "." {
            return None;
        }
        match rest.rfind('/') {
            Some(idx) => Some(Self {
                inner: format!("{}{}", prefix, &rest[..idx]),
            }),
            None if !prefix.is_empty() => Some(Self {
                inner: prefix.to_string(),
            }),
            None => Some(Self {
                inner: ".".to_string(),
            }),
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let (prefix, _) = split_prefix(&self.inner);
        let rest = &self.inner[prefix.len()..];
        match rest.rsplit('/').next() {
            Some("") | Some(".") | Some("..") | None => None,
            Some(name) => Some(name),
        }
    }

    /// Resolve symlinks and make the path absolute.
    ///
    /// Uses `dunce` so Windows results avoid the `\\?\` verbatim prefix.
    pub fn canonicalize(&self) -> crate::Result<Self> {
        let native = self.to_native();
        dunce::canonicalize(&native)
            .map(Self::new)
            .map_err(|e| crate::Error::io(native, e))
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Whether the path is rooted: `/x`, `C:/x` or a network path.
    pub fn is_absolute(&self) -> bool {
        split_prefix(&self.inner).1
    }

    /// Check if this appears to be a network path.
    ///
    /// Detects UNC paths (//server/share or \\server\share).
    pub fn is_network_path(&self) -> bool {
        self.inner.starts_with("//") && !self.inner.starts_with("///")
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Split off the root prefix of an already slash-normalized path.
///
/// Returns the prefix (`//`, `/`, `C:/`, `C:` or empty) and whether it
/// makes the path absolute.
fn split_prefix(path: &str) -> (&str, bool) {
    if path.starts_with("//") && !path.starts_with("///") {
        return (&path[..2], true);
    }
    if path.starts_with('/') {
        return (&path[..1], true);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.get(2) == Some(&b'/') {
            return (&path[..3], true);
        }
        return (&path[..2], false);
    }
    ("", false)
}

/// Lexically fold `.`, `..` and repeated separators.
fn clean(path: &str) -> String {
    let (prefix, absolute) = split_prefix(path);
    let mut parts: Vec<&str> = Vec::new();
    for segment in path[prefix.len()..].split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // Cannot climb above a root
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if prefix.is_empty() && body.is_empty() {
        ".".to_string()
    } else {
        format!("{}{}", prefix, body)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
