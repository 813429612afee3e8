//! Service layer for the rotation bot.
//!
//! This module defines the collaborators the pipeline talks to and their
//! production implementations:
//! - Champion catalog and rotation (`RiotClient`)
//! - Role classification scraping (`OpggScraper`)
//! - Chat channel access (`DiscordChannel`)
//! - Failure notifications (`Alerter`)
//! - Wiring from configuration (`Connections`)

mod alert;
mod connect;
mod discord;
mod opgg;
mod riot;

pub use alert::{Alerter, ErrorReport};
pub use connect::{Collaborators, Connections};
pub use discord::{DiscordChannel, DiscordHttp};
pub use opgg::OpggScraper;
pub use riot::RiotClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Catalog, ChannelMessage, Emoji, ManagedRole, MessagePayload, RoleMap, RotationIds,
};

/// Source of the champion catalog and the current rotation.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Numeric keys of the rotating champions.
    async fn rotating_ids(&self) -> Result<RotationIds>;

    /// Every champion, keyed by id. Names may still contain whitespace.
    async fn catalog(&self) -> Result<Catalog>;

    /// PNG icon bytes for one champion.
    async fn icon(&self, id: &str) -> Result<Vec<u8>>;

    /// How many icon downloads may run at once.
    fn icon_concurrency(&self) -> usize {
        4
    }
}

/// Source of champion id to role attributions.
#[async_trait]
pub trait ClassificationSource: Send + Sync {
    async fn classification(&self) -> Result<RoleMap>;
}

/// One text channel and the guild it lives in.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// User id the bot posts as.
    async fn own_identity(&self) -> Result<String>;

    /// Up to `limit` messages, most recent first. With `before`, only
    /// messages older than that message id are returned.
    async fn recent_messages(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>>;

    /// Post a message, returning its id.
    async fn post_message(&self, payload: &MessagePayload) -> Result<String>;

    async fn delete_message(&self, id: &str) -> Result<()>;

    /// Every custom emoji of the guild.
    async fn list_emojis(&self) -> Result<Vec<Emoji>>;

    async fn upload_emoji(&self, name: &str, png: &[u8]) -> Result<Emoji>;

    async fn delete_emoji(&self, emoji: &Emoji) -> Result<()>;

    /// The managed role attached to the bot's own member, if any.
    async fn own_role(&self) -> Result<Option<ManagedRole>>;

    async fn set_role_color(&self, role: &ManagedRole, color: u32) -> Result<()>;
}
