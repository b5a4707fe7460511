//! Turning mapping specs into filesystem paths

use std::path::Path;

use serde::Serialize;
use url::Url;
use xsync_fs::NormalizedPath;

use crate::descriptor::{Descriptor, MappingEntry};
use crate::{Error, Result};

/// The two absolute paths a mapping refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPair {
    pub local: NormalizedPath,
    pub external: NormalizedPath,
}

/// Resolves local specs against a base directory and external specs on
/// their own.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: NormalizedPath,
}

impl PathResolver {
    pub fn new(base_dir: NormalizedPath) -> Self {
        Self { base_dir }
    }

    pub fn for_descriptor(descriptor: &Descriptor) -> Self {
        Self::new(descriptor.base_dir.clone())
    }

    pub fn base_dir(&self) -> &NormalizedPath {
        &self.base_dir
    }

    /// Resolve both sides of a mapping.
    pub fn resolve(&self, entry: &MappingEntry) -> Result<ResolvedPair> {
        Ok(ResolvedPair {
            local: self.resolve_local(&entry.local_spec)?,
            external: resolve_external(&entry.external_spec)?,
        })
    }

    /// Resolve a local spec. Relative specs are joined onto the base
    /// directory; absolute specs and `file:` URLs stand alone.
    pub fn resolve_local(&self, spec: &str) -> Result<NormalizedPath> {
        let trimmed = check_spec(spec)?;
        let path = if has_file_scheme(trimmed) {
            from_file_url(spec, trimmed)?
        } else {
            self.base_dir.join(trimmed)
        };
        require_file_name(spec, trimmed, path)
    }
}

/// Resolve an external spec: an absolute native path, a UNC path, or a
/// `file:` URL.
pub fn resolve_external(spec: &str) -> Result<NormalizedPath> {
    let trimmed = check_spec(spec)?;

    let path = if Path::new(trimmed).is_absolute() {
        NormalizedPath::new(trimmed)
    } else {
        let normalized = NormalizedPath::new(trimmed);
        if normalized.is_network_path() {
            normalized
        } else if has_file_scheme(trimmed) {
            from_file_url(spec, trimmed)?
        } else if normalized.is_absolute() {
            return Err(Error::invalid_spec(
                spec,
                "drive-letter path is not addressable on this platform",
            ));
        } else if let Ok(url) = Url::parse(trimmed) {
            return Err(Error::invalid_spec(
                spec,
                format!("unsupported URI scheme '{}'", url.scheme()),
            ));
        } else {
            return Err(Error::invalid_spec(spec, "external path must be absolute"));
        }
    };

    require_file_name(spec, trimmed, path)
}

fn check_spec(spec: &str) -> Result<&str> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_spec(spec, "empty path"));
    }
    if trimmed.contains('\0') {
        return Err(Error::invalid_spec(spec, "path contains a NUL byte"));
    }
    Ok(trimmed)
}

fn has_file_scheme(spec: &str) -> bool {
    spec.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"))
}

fn from_file_url(spec: &str, trimmed: &str) -> Result<NormalizedPath> {
    let url = Url::parse(trimmed).map_err(|e| Error::invalid_spec(spec, e.to_string()))?;
    let path = url
        .to_file_path()
        .map_err(|()| Error::invalid_spec(spec, "URL does not denote a local file path"))?;
    Ok(NormalizedPath::new(path))
}

/// The mapping's own last segment must name a file; lexical folding would
/// otherwise turn `dir/..` or `dir/` into something that looks like one.
fn require_file_name(spec: &str, trimmed: &str, path: NormalizedPath) -> Result<NormalizedPath> {
    let last = trimmed.rsplit(['/', '\\']).next();
    if matches!(last, Some("" | "." | "..") | None) || path.file_name().is_none() {
        return Err(Error::invalid_spec(spec, "does not name a file"));
    }
    Ok(path)
}
