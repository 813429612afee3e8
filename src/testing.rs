//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{
    Catalog, ChannelMessage, Champion, Embed, Emoji, ManagedRole, MessagePayload, RoleMap,
    RotationIds,
};
use crate::services::{CatalogSource, ChatChannel, ClassificationSource};

/// How many calls a [`FakeChannel`] has seen. `total` counts side effects
/// only, so history reads are left out of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub reads: usize,
    pub posts: usize,
    pub message_deletes: usize,
    pub uploads: usize,
    pub emoji_deletes: usize,
    pub role_updates: usize,
}

impl Counters {
    pub fn total(&self) -> usize {
        self.posts + self.message_deletes + self.uploads + self.emoji_deletes + self.role_updates
    }
}

#[derive(Default)]
struct ChannelState {
    next_id: u64,
    /// Oldest first
    messages: Vec<ChannelMessage>,
    emojis: Vec<Emoji>,
    role: Option<ManagedRole>,
    counters: Counters,
    fail_posts: bool,
    failing_message_deletes: HashSet<String>,
    uploads_before_failure: Option<usize>,
}

impl ChannelState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Chat channel and guild kept in memory. Clones share state.
#[derive(Clone)]
pub struct FakeChannel {
    own_id: String,
    state: Arc<Mutex<ChannelState>>,
}

impl FakeChannel {
    pub fn new(own_id: &str) -> Self {
        Self {
            own_id: own_id.to_string(),
            state: Arc::new(Mutex::new(ChannelState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap()
    }

    /// Append a message as if `author` posted it, returning its id.
    pub fn push_message(&self, author: &str, content: &str, embeds: Vec<Embed>) -> String {
        let mut state = self.state();
        let id = state.next_id();
        state.messages.push(ChannelMessage {
            id: id.clone(),
            author_id: author.to_string(),
            content: content.to_string(),
            embeds,
            timestamp: None,
        });
        id
    }

    /// Add a guild emoji uploaded by `uploader`.
    pub fn add_emoji(&self, name: &str, uploader: Option<&str>) -> Emoji {
        let mut state = self.state();
        let emoji = Emoji {
            id: state.next_id(),
            name: name.to_string(),
            uploader_id: uploader.map(str::to_string),
        };
        state.emojis.push(emoji.clone());
        emoji
    }

    pub fn set_role(&self, role: Option<ManagedRole>) {
        self.state().role = role;
    }

    pub fn role(&self) -> Option<ManagedRole> {
        self.state().role.clone()
    }

    pub fn fail_posts(&self) {
        self.state().fail_posts = true;
    }

    pub fn fail_delete_message(&self, id: &str) {
        self.state().failing_message_deletes.insert(id.to_string());
    }

    /// Let `count` uploads succeed, then fail every later one.
    pub fn fail_uploads_after(&self, count: usize) {
        self.state().uploads_before_failure = Some(count);
    }

    /// Messages, most recent first.
    pub fn messages(&self) -> Vec<ChannelMessage> {
        self.state().messages.iter().rev().cloned().collect()
    }

    pub fn emojis(&self) -> Vec<Emoji> {
        self.state().emojis.clone()
    }

    pub fn counters(&self) -> Counters {
        self.state().counters
    }
}

#[async_trait]
impl ChatChannel for FakeChannel {
    async fn own_identity(&self) -> Result<String> {
        Ok(self.own_id.clone())
    }

    async fn recent_messages(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>> {
        // Ids are increasing integers, like snowflakes
        let before: Option<u64> = before.map(|id| id.parse().unwrap());

        let mut state = self.state();
        state.counters.reads += 1;
        Ok(state
            .messages
            .iter()
            .rev()
            .filter(|message| before.is_none_or(|b| message.id.parse::<u64>().unwrap() < b))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn post_message(&self, payload: &MessagePayload) -> Result<String> {
        if self.state().fail_posts {
            return Err(AppError::api("Discord", 500, "fake://messages", "post failed"));
        }
        let content = payload.content.clone().unwrap_or_default();
        let id = self.push_message(&self.own_id, &content, payload.embeds.clone());
        self.state().counters.posts += 1;
        Ok(id)
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        if state.failing_message_deletes.contains(id) {
            return Err(AppError::api("Discord", 403, "fake://messages", "Missing Permissions"));
        }
        state.messages.retain(|message| message.id != id);
        state.counters.message_deletes += 1;
        Ok(())
    }

    async fn list_emojis(&self) -> Result<Vec<Emoji>> {
        Ok(self.emojis())
    }

    async fn upload_emoji(&self, name: &str, _png: &[u8]) -> Result<Emoji> {
        {
            let state = self.state();
            if state.uploads_before_failure == Some(state.counters.uploads) {
                return Err(AppError::api("Discord", 400, "fake://emojis", "Maximum emojis reached"));
            }
        }
        let emoji = self.add_emoji(name, Some(&self.own_id));
        self.state().counters.uploads += 1;
        Ok(emoji)
    }

    async fn delete_emoji(&self, emoji: &Emoji) -> Result<()> {
        let mut state = self.state();
        state.emojis.retain(|existing| existing.id != emoji.id);
        state.counters.emoji_deletes += 1;
        Ok(())
    }

    async fn own_role(&self) -> Result<Option<ManagedRole>> {
        Ok(self.role())
    }

    async fn set_role_color(&self, role: &ManagedRole, color: u32) -> Result<()> {
        let mut state = self.state();
        state.role = Some(ManagedRole {
            id: role.id.clone(),
            color,
        });
        state.counters.role_updates += 1;
        Ok(())
    }
}

/// Catalog with fixed contents. Icons are the champion id as bytes.
#[derive(Default)]
pub struct FakeCatalog {
    pub ids: RotationIds,
    pub catalog: Catalog,
    pub failing_icons: HashSet<String>,
    icon_requests: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new(current: &[u32], champions: &[(&str, u32, &str)]) -> Self {
        Self {
            ids: RotationIds {
                current: current.iter().copied().collect(),
                low_level: Default::default(),
            },
            catalog: champions
                .iter()
                .map(|(id, key, name)| (id.to_string(), Champion::new(*id, *key, *name)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn icon_requests(&self) -> Vec<String> {
        self.icon_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn rotating_ids(&self) -> Result<RotationIds> {
        Ok(self.ids.clone())
    }

    async fn catalog(&self) -> Result<Catalog> {
        Ok(self.catalog.clone())
    }

    async fn icon(&self, id: &str) -> Result<Vec<u8>> {
        self.icon_requests.lock().unwrap().push(id.to_string());
        if self.failing_icons.contains(id) {
            return Err(AppError::api("Riot", 404, format!("fake://{id}.png"), "Not Found"));
        }
        Ok(id.as_bytes().to_vec())
    }
}

/// Classification returning a fixed map, or failing when built with `None`.
pub struct FakeClassification(pub Option<HashMap<String, String>>);

impl FakeClassification {
    pub fn new(roles: &[(&str, &str)]) -> Self {
        Self(Some(
            roles
                .iter()
                .map(|(id, role)| (id.to_string(), role.to_string()))
                .collect(),
        ))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl ClassificationSource for FakeClassification {
    async fn classification(&self) -> Result<RoleMap> {
        match &self.0 {
            Some(roles) => Ok(roles
                .iter()
                .map(|(id, label)| (id.as_str(), crate::models::Role::classify(label)))
                .collect()),
            None => Err(AppError::scrape("classification page unavailable")),
        }
    }
}
