//! Warden Test Utils
//!
//! Provides shared testing utilities for the warden bot. This crate offers a
//! builder for creating test contexts backed by a temporary data directory with
//! pre-seeded JSON settings files, and factories for Serenity gateway objects.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring the data directory
//! - **TestContext**: Test environment owning the temporary directory
//! - **TestError**: Error types that can occur during test setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn loads_settings() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_record("anti_raid.json", 123, serde_json::json!({ "messageLimit": 8 }))
//!         .build()
//!         .await?;
//!
//!     let path = test.path();
//!     // Load stores from `path`...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod serenity;
