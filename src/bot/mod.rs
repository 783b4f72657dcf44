//! Discord bot integration.
//!
//! The bot reacts to gateway events with anti-raid checks, greetings and audit
//! log entries, and serves the slash commands that configure them.
//!
//! # Gateway Intents
//!
//! The bot requires the following gateway intents:
//! - `GUILDS` - Guild updates (renames) and slash command interactions
//! - `GUILD_MESSAGES` - Message create events for the message and mention limits
//! - `GUILD_MEMBERS` - Member join, leave and role updates (privileged intent)
//! - `GUILD_WEBHOOKS` - Webhook changes for webhook protection
//!
//! Note: `GUILD_MEMBERS` is a privileged intent and must be explicitly enabled
//! in the Discord Developer Portal for the bot application.

pub mod command;
pub mod handler;
pub mod start;
