// src/pipeline/reconcile.rs

//! Replaces the announcement and the emojis that go with it.
//!
//! Emojis are uploaded only so their tokens can be embedded in the new
//! announcement; once it is posted they are deleted again. Leftovers of an
//! interrupted run are swept on the next one, as long as the rotation has
//! not changed in between.

use std::collections::{HashMap, HashSet};

use crate::error::{AppError, Result};
use crate::formatter::MessageFormatter;
use crate::models::{BotConfig, Emoji, Rotation};
use crate::services::ChatChannel;
use crate::storage::AnnouncementStore;
use crate::utils::log;

const TOTAL_STEPS: usize = 6;

/// Side effects of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub role_color_updated: bool,
    pub uploaded: usize,
    pub broken: bool,
    pub swept_emojis: usize,
    pub cleared_messages: usize,
    pub message_id: String,
    /// Uploaded emojis that could not be deleted afterwards
    pub leftover_emojis: Vec<Emoji>,
}

/// Drives the announcement channel and its guild.
pub struct Reconciler<'a> {
    channel: &'a dyn ChatChannel,
    store: &'a dyn AnnouncementStore,
    broken_list: Option<&'a dyn ChatChannel>,
    bot: &'a BotConfig,
    formatter: MessageFormatter,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        channel: &'a dyn ChatChannel,
        store: &'a dyn AnnouncementStore,
        broken_list: Option<&'a dyn ChatChannel>,
        bot: &'a BotConfig,
    ) -> Self {
        Self {
            channel,
            store,
            broken_list,
            bot,
            formatter: MessageFormatter::new(bot.format.clone(), bot.mention_everyone),
        }
    }

    /// Publish `rotation`, replacing whatever the channel held.
    ///
    /// Uploaded emojis are deleted again even when a later step fails.
    pub async fn reconcile(&self, rotation: &Rotation) -> Result<ReconcileReport> {
        log::step(1, TOTAL_STEPS, "Syncing role color");
        let role_color_updated = self.sync_role_color().await;

        log::step(2, TOTAL_STEPS, "Uploading rotation emojis");
        let uploads = self.upload_emojis(rotation).await?;

        let result = self.replace_announcement(rotation, uploads.as_ref()).await;

        log::step(6, TOTAL_STEPS, "Deleting rotation emojis");
        let uploaded = uploads.as_ref().map_or(0, HashMap::len);
        let leftover_emojis = self
            .release(uploads.into_iter().flat_map(HashMap::into_values))
            .await;

        let (broken, swept_emojis, cleared_messages, message_id) = result?;

        Ok(ReconcileReport {
            role_color_updated,
            uploaded,
            broken,
            swept_emojis,
            cleared_messages,
            message_id,
            leftover_emojis,
        })
    }

    async fn replace_announcement(
        &self,
        rotation: &Rotation,
        uploads: Option<&HashMap<String, Emoji>>,
    ) -> Result<(bool, usize, usize, String)> {
        log::step(3, TOTAL_STEPS, "Checking broken champions");
        let broken = self.contains_broken(rotation).await;

        log::step(4, TOTAL_STEPS, "Cleaning up the previous rotation");
        let keep: HashSet<&str> = uploads
            .into_iter()
            .flat_map(|emojis| emojis.values().map(|emoji| emoji.id.as_str()))
            .collect();
        let swept = self.sweep_emojis(rotation, &keep).await;
        let cleared = self.store.clear().await?;

        log::step(5, TOTAL_STEPS, "Publishing the new rotation");
        let payload = self.formatter.rotation_message(rotation, uploads, broken);
        let message_id = self.store.publish(&payload).await?;
        log::success(&format!("Sent rotation message {message_id}"));

        Ok((broken, swept, cleared, message_id))
    }

    /// Returns whether the color changed. Failures are only logged.
    async fn sync_role_color(&self) -> bool {
        let color = self.bot.format.role_color;

        match self.channel.own_role().await {
            Ok(Some(role)) if role.color == color => false,
            Ok(Some(role)) => match self.channel.set_role_color(&role, color).await {
                Ok(()) => {
                    ::log::info!("Changed role color to {:#08x}", color);
                    true
                }
                Err(e) => {
                    ::log::warn!("Failed to change role color: {}", e);
                    false
                }
            },
            Ok(None) => {
                ::log::warn!("The bot has no managed role of its own");
                false
            }
            Err(e) => {
                ::log::warn!("Failed to look up own role: {}", e);
                false
            }
        }
    }

    /// Upload one emoji per rotating champion, keyed by champion id.
    ///
    /// `None` when uploads are disabled. A failure releases what was already
    /// uploaded and aborts.
    async fn upload_emojis(&self, rotation: &Rotation) -> Result<Option<HashMap<String, Emoji>>> {
        let debug = &self.bot.debug;
        if !debug.send_emojis {
            ::log::info!("Emoji uploads disabled");
            return Ok(None);
        }

        let limit = debug.max_emojis.unwrap_or(usize::MAX);
        let mut uploaded: HashMap<String, Emoji> = HashMap::new();

        for champion in rotation.champions().take(limit) {
            let upload = match champion.icon.as_deref() {
                Some(icon) => self.channel.upload_emoji(&champion.emoji_name(), icon).await,
                None => Err(AppError::MissingIcon(champion.id.clone())),
            };

            match upload {
                Ok(emoji) => {
                    uploaded.insert(champion.id.clone(), emoji);
                }
                Err(e) => {
                    ::log::error!("Emoji upload for {} failed: {}", champion.id, e);
                    self.release(uploaded.into_values()).await;
                    return Err(e);
                }
            }
        }

        match debug.max_emojis {
            Some(max) => log::success(&format!(
                "Uploaded {} rotation emojis (capped at {max})",
                uploaded.len()
            )),
            None => log::success(&format!("Uploaded {} rotation emojis", uploaded.len())),
        }

        Ok(Some(uploaded))
    }

    /// Whether a rotating champion is named in the broken list channel.
    async fn contains_broken(&self, rotation: &Rotation) -> bool {
        let Some(channel) = self.broken_list else {
            return false;
        };
        if self.bot.broken_list_limit <= 0 {
            return false;
        }

        let limit = usize::try_from(self.bot.broken_list_limit).unwrap_or(usize::MAX);
        let messages = match channel.recent_messages(limit, None).await {
            Ok(messages) => messages,
            Err(e) => {
                ::log::warn!("Failed to read broken champion list: {}", e);
                return false;
            }
        };

        let broken = rotation.champions().any(|champion| {
            messages
                .iter()
                .any(|message| message.content.trim().eq_ignore_ascii_case(&champion.name))
        });

        if broken {
            ::log::info!("The rotation contains a broken champion");
        } else {
            ::log::info!("No broken champion in the current rotation");
        }
        broken
    }

    /// Delete emojis this bot uploaded for rotating champions, except `keep`.
    async fn sweep_emojis(&self, rotation: &Rotation, keep: &HashSet<&str>) -> usize {
        let own_id = match self.channel.own_identity().await {
            Ok(id) => id,
            Err(e) => {
                ::log::warn!("Skipping emoji cleanup, own identity unknown: {}", e);
                return 0;
            }
        };
        let emojis = match self.channel.list_emojis().await {
            Ok(emojis) => emojis,
            Err(e) => {
                ::log::warn!("Skipping emoji cleanup, listing failed: {}", e);
                return 0;
            }
        };

        let names: Vec<String> = rotation.champions().map(|c| c.emoji_name()).collect();
        let stale = emojis.into_iter().filter(|emoji| {
            emoji.uploader_id.as_deref() == Some(own_id.as_str())
                && !keep.contains(emoji.id.as_str())
                && names
                    .iter()
                    .any(|name| emoji.base_name().eq_ignore_ascii_case(name))
        });

        let mut swept = 0;
        for emoji in stale {
            match self.channel.delete_emoji(&emoji).await {
                Ok(()) => swept += 1,
                Err(e) => ::log::warn!("Failed to delete leftover emoji {}: {}", emoji.name, e),
            }
        }

        ::log::info!("Deleted {} leftover emojis", swept);
        swept
    }

    /// Delete emojis, returning the ones that could not be deleted.
    async fn release(&self, emojis: impl IntoIterator<Item = Emoji>) -> Vec<Emoji> {
        let mut leftover = Vec::new();
        for emoji in emojis {
            if let Err(e) = self.channel.delete_emoji(&emoji).await {
                ::log::warn!("Failed to delete emoji {}: {}", emoji.name, e);
                leftover.push(emoji);
            }
        }
        leftover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Champion, ManagedRole, Role, RoleBuckets};
    use crate::storage::ChannelStore;
    use crate::testing::FakeChannel;

    fn champion(id: &str, key: u32) -> Champion {
        let mut champion = Champion::new(id, key, id);
        champion.icon = Some(id.as_bytes().to_vec());
        champion
    }

    fn rotation() -> Rotation {
        let mut by_role: RoleBuckets = Role::NAMED.iter().map(|r| (*r, Vec::new())).collect();
        by_role.insert(Role::Top, vec![champion("Lulu", 3)]);
        by_role.insert(Role::Bottom, vec![champion("Draven", 1)]);
        Rotation {
            by_role,
            ..Default::default()
        }
    }

    async fn reconcile(channel: &FakeChannel, bot: &BotConfig) -> Result<ReconcileReport> {
        let store = ChannelStore::new(channel);
        Reconciler::new(channel, &store, None, bot)
            .reconcile(&rotation())
            .await
    }

    #[tokio::test]
    async fn test_reconcile_replaces_announcement() {
        let channel = FakeChannel::new("bot");
        channel.push_message("bot", "old rotation", Vec::new());

        let report = reconcile(&channel, &BotConfig::default()).await.unwrap();

        assert_eq!(report.uploaded, 2);
        assert_eq!(report.cleared_messages, 1);
        assert!(report.leftover_emojis.is_empty());

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, report.message_id);
        assert!(messages[0].fields()[0].value.contains("<:Lulu:"));
        assert!(channel.emojis().is_empty());
    }

    #[tokio::test]
    async fn test_role_color_synced_only_when_different() {
        let bot = BotConfig::default();
        let channel = FakeChannel::new("bot");
        channel.set_role(Some(ManagedRole {
            id: "r".into(),
            color: 0,
        }));

        let report = reconcile(&channel, &bot).await.unwrap();
        assert!(report.role_color_updated);
        assert_eq!(channel.role().unwrap().color, bot.format.role_color);

        let report = reconcile(&channel, &bot).await.unwrap();
        assert!(!report.role_color_updated);
        assert_eq!(channel.counters().role_updates, 1);
    }

    #[tokio::test]
    async fn test_sweep_deletes_own_leftovers_only() {
        let channel = FakeChannel::new("bot");
        channel.add_emoji("Draven~1", Some("bot"));
        channel.add_emoji("draven", Some("someone"));
        channel.add_emoji("Garen", Some("bot"));

        let report = reconcile(&channel, &BotConfig::default()).await.unwrap();

        assert_eq!(report.swept_emojis, 1);
        let names: Vec<String> = channel.emojis().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["draven", "Garen"]);
    }

    #[tokio::test]
    async fn test_upload_cap_and_switch() {
        let channel = FakeChannel::new("bot");
        let mut bot = BotConfig::default();
        bot.debug.max_emojis = Some(1);

        let report = reconcile(&channel, &bot).await.unwrap();
        assert_eq!(report.uploaded, 1);

        let channel = FakeChannel::new("bot");
        bot.debug.send_emojis = false;
        let report = reconcile(&channel, &bot).await.unwrap();
        assert_eq!(report.uploaded, 0);
        assert_eq!(channel.counters().uploads, 0);
        assert_eq!(channel.messages()[0].fields()[0].value, "Lulu");
    }

    #[tokio::test]
    async fn test_upload_failure_releases_partial_uploads() {
        let channel = FakeChannel::new("bot");
        channel.push_message("bot", "old rotation", Vec::new());
        channel.fail_uploads_after(1);

        let result = reconcile(&channel, &BotConfig::default()).await;

        assert!(result.is_err());
        assert!(channel.emojis().is_empty());
        let counters = channel.counters();
        assert_eq!(counters.uploads, 1);
        assert_eq!(counters.emoji_deletes, 1);
        assert_eq!(counters.posts, 0);
        assert_eq!(channel.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_icon_is_fatal() {
        let channel = FakeChannel::new("bot");
        let store = ChannelStore::new(&channel);
        let bot = BotConfig::default();
        let mut rotation = rotation();
        rotation
            .by_role
            .insert(Role::Mid, vec![Champion::new("Ahri", 103, "Ahri")]);

        let result = Reconciler::new(&channel, &store, None, &bot)
            .reconcile(&rotation)
            .await;

        assert!(matches!(result, Err(AppError::MissingIcon(id)) if id == "Ahri"));
        assert!(channel.emojis().is_empty());
        assert_eq!(channel.counters().posts, 0);
    }

    #[tokio::test]
    async fn test_broken_list_adds_warning_field() {
        let channel = FakeChannel::new("bot");
        let broken_list = FakeChannel::new("bot");
        broken_list.push_message("mod", "draven", Vec::new());
        let store = ChannelStore::new(&channel);
        let bot = BotConfig::default();

        let report = Reconciler::new(&channel, &store, Some(&broken_list), &bot)
            .reconcile(&rotation())
            .await
            .unwrap();

        assert!(report.broken);
        assert_eq!(channel.messages()[0].fields().len(), 6);
        assert_eq!(broken_list.counters().reads, 1);
    }

    #[tokio::test]
    async fn test_broken_list_disabled_by_limit() {
        let channel = FakeChannel::new("bot");
        let broken_list = FakeChannel::new("bot");
        broken_list.push_message("mod", "Draven", Vec::new());
        let store = ChannelStore::new(&channel);
        let mut bot = BotConfig::default();
        bot.broken_list_limit = 0;

        let report = Reconciler::new(&channel, &store, Some(&broken_list), &bot)
            .reconcile(&rotation())
            .await
            .unwrap();

        assert!(!report.broken);
        assert_eq!(channel.messages()[0].fields().len(), 5);
        assert_eq!(broken_list.counters().reads, 0);
    }
}
