// src/services/discord.rs

//! Discord REST client.
//!
//! Only the handful of endpoints the bot needs: channel lookup, message
//! history, posting and deleting messages, guild emojis and the bot's own
//! managed role.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{
    ChannelMessage, DiscordConfig, Embed, Emoji, ManagedRole, MessagePayload,
};
use crate::services::ChatChannel;
use crate::utils::http::ensure_success;

const SERVICE: &str = "Discord";

/// Largest page the message history endpoint serves.
const MAX_PAGE: usize = 100;

const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

#[derive(Debug, Deserialize)]
struct ChannelDto {
    id: String,
    guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageDto {
    id: String,
    author: UserDto,
    #[serde(default)]
    content: String,
    #[serde(default)]
    embeds: Vec<Embed>,
    timestamp: Option<DateTime<Utc>>,
}

impl From<MessageDto> for ChannelMessage {
    fn from(dto: MessageDto) -> Self {
        Self {
            id: dto.id,
            author_id: dto.author.id,
            content: dto.content,
            embeds: dto.embeds,
            timestamp: dto.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmojiDto {
    id: Option<String>,
    name: Option<String>,
    user: Option<UserDto>,
}

impl EmojiDto {
    fn into_emoji(self) -> Option<Emoji> {
        Some(Emoji {
            id: self.id?,
            name: self.name?,
            uploader_id: self.user.map(|user| user.id),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MemberDto {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoleDto {
    id: String,
    #[serde(default)]
    color: u32,
    #[serde(default)]
    managed: bool,
}

/// Authenticated access to the Discord REST API.
#[derive(Clone)]
pub struct DiscordHttp {
    client: Client,
    api_url: String,
    token: String,
}

impl DiscordHttp {
    pub fn new(client: Client, config: &DiscordConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.api_url, path))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = ensure_success(SERVICE, request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        ensure_success(SERVICE, request.send().await?).await?;
        Ok(())
    }

    /// Id of the bot user.
    pub async fn current_user_id(&self) -> Result<String> {
        let user: UserDto = self
            .send_json(self.request(Method::GET, "users/@me"))
            .await?;
        Ok(user.id)
    }

    /// Look up a channel, `None` when it does not exist or is not visible.
    async fn channel(&self, id: u64) -> Result<Option<ChannelDto>> {
        let response = self
            .request(Method::GET, &format!("channels/{id}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => Ok(None),
            _ => Ok(Some(ensure_success(SERVICE, response).await?.json().await?)),
        }
    }
}

/// A guild text channel, as seen by the bot.
pub struct DiscordChannel {
    http: DiscordHttp,
    channel_id: String,
    guild_id: String,
    self_id: String,
}

impl DiscordChannel {
    /// Resolve a configured channel id.
    ///
    /// Fails when the channel does not exist, is not visible to the bot, or
    /// does not belong to a guild.
    pub async fn connect(http: DiscordHttp, channel_id: u64, purpose: &str) -> Result<Self> {
        let channel = http.channel(channel_id).await?.ok_or_else(|| {
            AppError::config(format!("The {purpose} channel ID provided isn't valid"))
        })?;
        let guild_id = channel.guild_id.ok_or_else(|| {
            AppError::config(format!("The {purpose} channel is not part of a server"))
        })?;
        let self_id = http.current_user_id().await?;

        log::debug!("Connected to {} channel {}", purpose, channel.id);

        Ok(Self {
            http,
            channel_id: channel.id,
            guild_id,
            self_id,
        })
    }

    fn messages_path(&self) -> String {
        format!("channels/{}/messages", self.channel_id)
    }

    fn guild_path(&self, rest: &str) -> String {
        format!("guilds/{}/{}", self.guild_id, rest)
    }
}

#[async_trait]
impl ChatChannel for DiscordChannel {
    async fn own_identity(&self) -> Result<String> {
        Ok(self.self_id.clone())
    }

    async fn recent_messages(
        &self,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>> {
        let mut messages: Vec<ChannelMessage> = Vec::new();
        let mut cursor = before.map(str::to_string);

        while messages.len() < limit {
            let page_size = (limit - messages.len()).min(MAX_PAGE);
            let mut request = self
                .http
                .request(Method::GET, &self.messages_path())
                .query(&[("limit", page_size.to_string())]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("before", cursor.as_str())]);
            }

            let page: Vec<MessageDto> = self.http.send_json(request).await?;
            let exhausted = page.len() < page_size;
            messages.extend(page.into_iter().map(ChannelMessage::from));
            cursor = messages.last().map(|message| message.id.clone());

            if exhausted {
                break;
            }
        }

        Ok(messages)
    }

    async fn post_message(&self, payload: &MessagePayload) -> Result<String> {
        let request = self
            .http
            .request(Method::POST, &self.messages_path())
            .json(payload);
        let message: MessageDto = self.http.send_json(request).await?;
        Ok(message.id)
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", self.messages_path(), id);
        self.http
            .send_empty(self.http.request(Method::DELETE, &path))
            .await
    }

    async fn list_emojis(&self) -> Result<Vec<Emoji>> {
        let request = self.http.request(Method::GET, &self.guild_path("emojis"));
        let emojis: Vec<EmojiDto> = self.http.send_json(request).await?;
        Ok(emojis.into_iter().filter_map(EmojiDto::into_emoji).collect())
    }

    async fn upload_emoji(&self, name: &str, png: &[u8]) -> Result<Emoji> {
        let image = format!("data:image/png;base64,{}", STANDARD.encode(png));
        let request = self
            .http
            .request(Method::POST, &self.guild_path("emojis"))
            .header(AUDIT_LOG_REASON, "For current rotation")
            .json(&serde_json::json!({ "name": name, "image": image }));

        let emoji: EmojiDto = self.http.send_json(request).await?;
        emoji.into_emoji().ok_or_else(|| {
            AppError::api(SERVICE, 200, self.guild_path("emojis"), "emoji created without id")
        })
    }

    async fn delete_emoji(&self, emoji: &Emoji) -> Result<()> {
        let request = self
            .http
            .request(Method::DELETE, &self.guild_path(&format!("emojis/{}", emoji.id)))
            .header(AUDIT_LOG_REASON, "Leftover of rotation");
        self.http.send_empty(request).await
    }

    async fn own_role(&self) -> Result<Option<ManagedRole>> {
        let member_path = self.guild_path(&format!("members/{}", self.self_id));
        let member: MemberDto = self
            .http
            .send_json(self.http.request(Method::GET, &member_path))
            .await?;
        let roles: Vec<RoleDto> = self
            .http
            .send_json(self.http.request(Method::GET, &self.guild_path("roles")))
            .await?;

        Ok(roles
            .into_iter()
            .find(|role| role.managed && member.roles.contains(&role.id))
            .map(|role| ManagedRole {
                id: role.id,
                color: role.color,
            }))
    }

    async fn set_role_color(&self, role: &ManagedRole, color: u32) -> Result<()> {
        let request = self
            .http
            .request(Method::PATCH, &self.guild_path(&format!("roles/{}", role.id)))
            .json(&serde_json::json!({ "color": color }));
        self.http.send_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let json = r#"{
            "id": "1001",
            "type": 0,
            "author": {"id": "42", "username": "rotation-bot", "bot": true},
            "content": "@everyone",
            "timestamp": "2021-10-12T08:00:00.000000+00:00",
            "embeds": [{
                "type": "rich",
                "title": "New champion rotation!",
                "color": 3832965,
                "fields": [
                    {"name": "Top", "value": "<:Lulu:7> Lulu", "inline": false},
                    {"name": "Jungle", "value": "‎", "inline": false}
                ]
            }]
        }"#;
        let dto: MessageDto = serde_json::from_str(json).unwrap();
        let message = ChannelMessage::from(dto);

        assert_eq!(message.author_id, "42");
        assert_eq!(message.fields().len(), 2);
        assert_eq!(message.fields()[0].value, "<:Lulu:7> Lulu");
        assert!(message.timestamp.is_some());
    }

    #[test]
    fn test_parse_emojis() {
        let json = r#"[
            {"id": "7", "name": "Lulu", "user": {"id": "42"}, "animated": false},
            {"id": "8", "name": "Draven~1"},
            {"id": null, "name": "broken"}
        ]"#;
        let dtos: Vec<EmojiDto> = serde_json::from_str(json).unwrap();
        let emojis: Vec<Emoji> = dtos.into_iter().filter_map(EmojiDto::into_emoji).collect();

        assert_eq!(emojis.len(), 2);
        assert_eq!(emojis[0].uploader_id.as_deref(), Some("42"));
        assert_eq!(emojis[1].uploader_id, None);
        assert_eq!(emojis[1].base_name(), "Draven");
    }

    #[test]
    fn test_parse_roles() {
        let json = r#"[
            {"id": "1", "name": "@everyone", "color": 0, "managed": false},
            {"id": "2", "name": "rotation-bot", "color": 3832965, "managed": true}
        ]"#;
        let roles: Vec<RoleDto> = serde_json::from_str(json).unwrap();
        assert!(roles[1].managed);
        assert_eq!(roles[1].color, 0x3a7c85);
    }
}
