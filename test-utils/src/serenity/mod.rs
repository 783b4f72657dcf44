//! Test factories for creating Serenity API objects.
//!
//! This module provides factory functions for creating mock Serenity structs
//! (User, Member, Message) for testing purposes. These factories create valid
//! Serenity objects by deserializing JSON, simulating what Discord's gateway
//! would deliver.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::{create_test_member, create_test_message, create_test_user};
//!
//! let author = create_test_user(30, "spammer", false);
//! let message = create_test_message(1, 10, 20, author.clone());
//! let member = create_test_member(10, author, &[40]);
//! ```
//!
//! # Available Factories
//!
//! - `user::create_test_user` - Create Serenity User objects
//! - `member::create_test_member` - Create Serenity Member objects
//! - `message::create_test_message` - Create Serenity Message objects

pub mod member;
pub mod message;
pub mod user;

// Re-export commonly used functions for convenience
pub use member::create_test_member;
pub use message::create_test_message;
pub use user::create_test_user;
