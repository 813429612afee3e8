//! Announcement storage.
//!
//! The bot keeps no state of its own: the last announcement lives in the
//! announcement channel and is read back on every run. [`AnnouncementStore`]
//! hides that behind three operations so another backend can replace the
//! channel without touching the comparator or the reconciler.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChannelMessage, MessagePayload};
use crate::services::ChatChannel;

/// Page size used while clearing the channel.
const CLEAR_PAGE: usize = 100;

/// Trait for announcement storage backends.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// The last announcement, if it was published by this bot.
    async fn read_last_announcement(&self) -> Result<Option<ChannelMessage>>;

    /// Publish a new announcement, returning its id.
    async fn publish(&self, message: &MessagePayload) -> Result<String>;

    /// Remove every stored announcement, returning how many were removed.
    async fn clear(&self) -> Result<usize>;
}

/// Store backed by the announcement channel's message history.
pub struct ChannelStore<'a> {
    channel: &'a dyn ChatChannel,
}

impl<'a> ChannelStore<'a> {
    pub fn new(channel: &'a dyn ChatChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl AnnouncementStore for ChannelStore<'_> {
    async fn read_last_announcement(&self) -> Result<Option<ChannelMessage>> {
        let Some(last) = self.channel.recent_messages(1, None).await?.into_iter().next() else {
            log::debug!("Announcement channel is empty");
            return Ok(None);
        };

        let own_id = self.channel.own_identity().await?;
        if last.author_id != own_id {
            log::debug!("Last message {} was posted by someone else", last.id);
            return Ok(None);
        }

        Ok(Some(last))
    }

    async fn publish(&self, message: &MessagePayload) -> Result<String> {
        self.channel.post_message(message).await
    }

    async fn clear(&self) -> Result<usize> {
        let mut deleted = 0;
        let mut failed = 0;
        let mut before: Option<String> = None;

        // Walk backwards from the newest message; every message newer than
        // the cursor has been tried exactly once.
        loop {
            let page = self
                .channel
                .recent_messages(CLEAR_PAGE, before.as_deref())
                .await?;
            let exhausted = page.len() < CLEAR_PAGE;
            before = page.last().map(|message| message.id.clone());

            for message in page {
                match self.channel.delete_message(&message.id).await {
                    Ok(()) => deleted += 1,
                    Err(e) => {
                        log::warn!("Failed to delete message {}: {}", message.id, e);
                        failed += 1;
                    }
                }
            }

            if exhausted {
                break;
            }
        }

        if failed > 0 {
            log::warn!("{} messages could not be deleted", failed);
        }

        log::info!("Deleted {} messages", deleted);
        Ok(deleted)
    }
}
