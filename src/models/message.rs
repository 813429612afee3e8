//! Chat message, embed and emoji structures.
//!
//! The payload types serialize to the shape the Discord REST API expects, so
//! the formatter's output can be posted as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Left-to-right mark: renders as nothing and contains no letters.
pub const INVISIBLE_TEXT: &str = "\u{200E}";

/// A message to post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default)]
    pub embeds: Vec<Embed>,
}

/// Rich embed attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,

    #[serde(default)]
    pub fields: Vec<EmbedField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

/// Labelled block of text inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// A message as read back from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub embeds: Vec<Embed>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChannelMessage {
    /// Fields of the first embed, empty when the message has none.
    pub fn fields(&self) -> &[EmbedField] {
        self.embeds
            .first()
            .map(|embed| embed.fields.as_slice())
            .unwrap_or(&[])
    }
}

/// A custom guild emoji.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Emoji {
    pub id: String,
    pub name: String,
    /// User that uploaded it, when the API disclosed it
    pub uploader_id: Option<String>,
}

impl Emoji {
    /// Inline token that renders the emoji inside message text.
    pub fn token(&self) -> String {
        format!("<:{}:{}>", self.name, self.id)
    }

    /// Name with Discord's `~N` de-duplication suffix removed.
    pub fn base_name(&self) -> &str {
        self.name.split('~').next().unwrap_or(&self.name)
    }
}

/// Role managed by the platform for the bot's own account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRole {
    pub id: String,
    pub color: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_token_and_base_name() {
        let emoji = Emoji {
            id: "42".into(),
            name: "Draven~1".into(),
            uploader_id: None,
        };
        assert_eq!(emoji.token(), "<:Draven~1:42>");
        assert_eq!(emoji.base_name(), "Draven");
    }

    #[test]
    fn test_payload_skips_empty_content() {
        let payload = MessagePayload {
            content: None,
            embeds: vec![Embed {
                title: Some("New champion rotation!".into()),
                fields: vec![EmbedField::new("Top", "Lulu")],
                ..Default::default()
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["embeds"][0]["fields"][0]["name"], "Top");
        assert_eq!(json["embeds"][0]["fields"][0]["inline"], false);
    }

    #[test]
    fn test_fields_of_message_without_embed() {
        let message = ChannelMessage {
            id: "1".into(),
            author_id: "2".into(),
            content: "hello".into(),
            embeds: vec![],
            timestamp: None,
        };
        assert!(message.fields().is_empty());
    }
}
