use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment owning a temporary data directory.
///
/// The directory and everything in it is removed when the context is dropped,
/// so keep the context alive for the duration of the test.
pub struct TestContext {
    dir: TempDir,
}

impl TestContext {
    pub(crate) fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    /// Path of the data directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the data directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Reads a file from the data directory as a string.
    ///
    /// # Panics
    /// - If the file does not exist or is not valid UTF-8
    pub async fn read(&self, name: &str) -> String {
        tokio::fs::read_to_string(self.file(name))
            .await
            .expect("Failed to read file from test data directory")
    }

    /// Reads and parses a JSON file from the data directory.
    ///
    /// # Panics
    /// - If the file is missing or not valid JSON
    pub async fn read_json(&self, name: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(name).await).expect("Test data file is not valid JSON")
    }
}
