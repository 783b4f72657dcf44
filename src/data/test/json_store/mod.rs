use crate::{
    data::{AntiRaidStore, GreetingStore},
    error::settings::SettingsError,
    model::settings::{AntiRaidPatch, AntiRaidSettings},
};
use serenity::all::{GuildId, UserId};
use test_utils::builder::TestBuilder;

mod get;
mod load;
mod modify;
mod remove;
mod set;

const GUILD: u64 = 123456789;
