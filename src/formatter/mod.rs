// src/formatter/mod.rs

//! Announcement and error message rendering.
//!
//! Pure functions from domain values to [`MessagePayload`]s; nothing here
//! talks to the network.

mod style;

use std::collections::HashMap;

use crate::models::{
    Embed, EmbedField, EmbedFooter, EmbedThumbnail, Emoji, FormatConfig, MessagePayload, Rotation,
    INVISIBLE_TEXT,
};
use crate::services::ErrorReport;

/// Color of error embeds.
pub const ERROR_COLOR: u32 = 0xED4245;

const EVERYONE: &str = "@everyone";

/// Builds the rotation announcement.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    format: FormatConfig,
    mention_everyone: bool,
}

impl MessageFormatter {
    pub fn new(format: FormatConfig, mention_everyone: bool) -> Self {
        Self {
            format,
            mention_everyone,
        }
    }

    /// Render the announcement for `rotation`.
    ///
    /// One field per role in canonical order. `emojis` maps champion ids to
    /// uploaded emojis; `broken` appends the broken champion warning.
    pub fn rotation_message(
        &self,
        rotation: &Rotation,
        emojis: Option<&HashMap<String, Emoji>>,
        broken: bool,
    ) -> MessagePayload {
        let tokens: Option<HashMap<String, String>> = emojis.map(|emojis| {
            emojis
                .iter()
                .map(|(id, emoji)| (id.clone(), emoji.token()))
                .collect()
        });

        log::debug!(
            "Creating text with message style {:?}",
            self.format.message_style
        );

        let mut fields: Vec<EmbedField> = rotation
            .by_role
            .iter()
            .map(|(role, champions)| {
                let text = self.format.message_style.join(tokens.as_ref(), champions);
                if text.is_empty() {
                    log::debug!("No champions for {}", role);
                    EmbedField::new(role.display_name(), INVISIBLE_TEXT)
                } else {
                    EmbedField::new(role.display_name(), text)
                }
            })
            .collect();

        if broken {
            if let Some(warning) = self.broken_message(rotation) {
                fields.push(EmbedField::new(
                    INVISIBLE_TEXT,
                    format!("||**⚠ {warning}**||"),
                ));
            }
        }

        MessagePayload {
            content: self.mention_everyone.then(|| EVERYONE.to_string()),
            embeds: vec![Embed {
                title: Some(self.format.new_rotation_message.clone()),
                color: Some(self.format.embed_color),
                thumbnail: self
                    .format
                    .embed_thumbnail_url
                    .clone()
                    .map(|url| EmbedThumbnail { url }),
                fields,
                footer: None,
            }],
        }
    }

    /// Warning shown for this rotation, stable across reruns.
    fn broken_message(&self, rotation: &Rotation) -> Option<&str> {
        let messages = &self.format.broken_messages;
        if messages.is_empty() {
            return None;
        }
        let seed: u64 = rotation.champions().map(|c| u64::from(c.key)).sum();
        let index = (seed % messages.len() as u64) as usize;
        messages.get(index).map(String::as_str)
    }
}

/// Render an error report as a red embed.
pub fn error_message(report: &ErrorReport) -> MessagePayload {
    let fields = report
        .details
        .iter()
        .map(|(title, lines)| EmbedField::new(title.as_str(), lines.join("\n")))
        .collect();

    MessagePayload {
        content: None,
        embeds: vec![Embed {
            title: Some(report.message.clone()),
            color: Some(ERROR_COLOR),
            thumbnail: None,
            fields,
            footer: Some(EmbedFooter {
                text: report.component.clone(),
            }),
        }],
    }
}
