//! # econwatch channels
//! Message delivery implementations behind the `MessageSink` trait.

pub mod discord;

pub use discord::DiscordChannel;
