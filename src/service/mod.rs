pub mod anti_raid;
pub mod greeting;
pub mod moderation;
pub mod rate_guard;
