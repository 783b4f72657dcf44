use std::collections::BTreeMap;

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with a pre-seeded data directory.
///
/// Records added via `with_record` are grouped per file into the
/// `{ "<guildId>": { ... } }` layout used by the settings stores. Raw files added
/// via `with_file` are written verbatim, which is useful for corrupted input.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
///
/// let test = TestBuilder::new()
///     .with_record("anti_raid.json", 1, serde_json::json!({ "enabled": true }))
///     .with_file("welcome.json", "{ not json")
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct TestBuilder {
    /// Per-file map of guild id to record JSON.
    records: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    /// Files written verbatim, after the record files.
    raw_files: Vec<(String, String)>,
}

impl TestBuilder {
    /// Creates a new builder with an empty data directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guild record to a settings file.
    ///
    /// # Arguments
    /// - `file` - File name inside the data directory, e.g. `anti_raid.json`
    /// - `guild_id` - Guild the record belongs to
    /// - `record` - JSON value stored under the guild id key
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_record(mut self, file: &str, guild_id: u64, record: serde_json::Value) -> Self {
        self.records
            .entry(file.to_string())
            .or_default()
            .insert(guild_id.to_string(), record);
        self
    }

    /// Adds a file with verbatim contents.
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_file(mut self, file: &str, contents: &str) -> Self {
        self.raw_files.push((file.to_string(), contents.to_string()));
        self
    }

    /// Creates the temporary directory and writes all configured files.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context owning the populated directory
    /// - `Err(TestError::Io)` - Failed to create the directory or write a file
    /// - `Err(TestError::Json)` - Failed to serialize a record file
    pub async fn build(self) -> Result<TestContext, TestError> {
        let dir = tempfile::tempdir()?;

        for (file, records) in self.records {
            let contents = serde_json::to_string_pretty(&records)?;
            tokio::fs::write(dir.path().join(file), contents).await?;
        }

        for (file, contents) in self.raw_files {
            tokio::fs::write(dir.path().join(file), contents).await?;
        }

        Ok(TestContext::new(dir))
    }
}
