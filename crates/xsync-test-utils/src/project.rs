//! [`TestProject`] builder for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// File name of the descriptor written by [`TestProject::write_descriptor`].
pub const DESCRIPTOR_NAME: &str = "Project.flprj";

/// A temporary tree with two siblings:
///
/// ```text
/// <root>/project/   descriptor + local copies
/// <root>/share/     external copies
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use xsync_test_utils::project::TestProject;
///
/// let project = TestProject::new();
/// project.write_local("a.css", "body {}");
/// let descriptor = project.write_descriptor(&[("a.css", &project.external_spec("a.css"))]);
/// assert!(descriptor.exists());
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create the temp tree with empty `project/` and `share/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("project")).unwrap();
        fs::create_dir_all(temp_dir.path().join("share")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root().join("project")
    }

    pub fn share_dir(&self) -> PathBuf {
        self.root().join("share")
    }

    /// Path of a local copy.
    pub fn local(&self, rel: &str) -> PathBuf {
        self.project_dir().join(rel)
    }

    /// Path of an external copy.
    pub fn external(&self, rel: &str) -> PathBuf {
        self.share_dir().join(rel)
    }

    /// Absolute external spec for `rel`, as it would appear in a descriptor.
    pub fn external_spec(&self, rel: &str) -> String {
        self.external(rel).to_string_lossy().into_owned()
    }

    pub fn write_local(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.local(rel), content)
    }

    pub fn write_external(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.external(rel), content)
    }

    /// Write a local copy and stamp it `secs` seconds after the epoch.
    pub fn write_local_at(&self, rel: &str, content: &str, secs: u64) -> PathBuf {
        let path = self.write_local(rel, content);
        set_mtime(&path, secs);
        path
    }

    /// Write an external copy and stamp it `secs` seconds after the epoch.
    pub fn write_external_at(&self, rel: &str, content: &str, secs: u64) -> PathBuf {
        let path = self.write_external(rel, content);
        set_mtime(&path, secs);
        path
    }

    /// Write `project/Project.flprj` with one `Mapping` per `(local, external)`.
    pub fn write_descriptor(&self, mappings: &[(&str, &str)]) -> PathBuf {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<CatapultProject>\n  <Synchronize>\n",
        );
        for (local, external) in mappings {
            xml.push_str(&format!(
                "    <Mapping ProjectPath=\"{}\" ExternalPath=\"{}\" />\n",
                escape_attr(local),
                escape_attr(external)
            ));
        }
        xml.push_str("  </Synchronize>\n</CatapultProject>\n");
        self.write_raw_descriptor(&xml)
    }

    /// Write arbitrary descriptor text.
    pub fn write_raw_descriptor(&self, xml: &str) -> PathBuf {
        write_file(&self.project_dir().join(DESCRIPTOR_NAME), xml)
    }

    /// Read a file under the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that the file at `path` holds exactly `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_content(&self, path: &Path, content: &str) {
        let actual = self.read(path);
        assert_eq!(
            actual,
            content,
            "File {} does not hold expected content",
            path.display()
        );
    }

    /// Assert that `path` does **not** exist.
    pub fn assert_missing(&self, path: &Path) {
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }
}

/// Set a file's modification time to `secs` after the Unix epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(stamp))
        .unwrap_or_else(|e| panic!("Could not set mtime of {}: {e}", path.display()));
}

/// Modification time of a file in whole seconds after the epoch.
pub fn mtime_secs(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
