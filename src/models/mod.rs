// src/models/mod.rs

//! Domain models for the rotation bot.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod champion;
mod config;
mod message;
mod role;

// Re-export all public types
pub use champion::{Catalog, Champion, RoleBuckets, Rotation, RotationIds};
pub use config::{
    BotConfig, ClassificationConfig, Config, DebugConfig, DiscordConfig, FormatConfig,
    HttpConfig, LoggingConfig, MessageStyle, RiotConfig,
};
pub use message::{
    ChannelMessage, Embed, EmbedField, EmbedFooter, EmbedThumbnail, Emoji, ManagedRole,
    MessagePayload, INVISIBLE_TEXT,
};
pub use role::{Role, RoleMap};
