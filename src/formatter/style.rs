// src/formatter/style.rs

//! Ways of joining a role's champions into one field value.

use std::collections::HashMap;

use crate::models::{Champion, MessageStyle};

impl MessageStyle {
    /// Render `champions` with their emoji tokens (keyed by champion id).
    ///
    /// Empty input renders as an empty string. Without tokens every style
    /// falls back to plain names.
    pub fn join(self, emojis: Option<&HashMap<String, String>>, champions: &[Champion]) -> String {
        let emoji = |champion: &Champion| emojis.and_then(|map| map.get(&champion.id));
        let with_emoji = |champion: &Champion| match emoji(champion) {
            Some(token) => format!("{} {}", token, champion.name),
            None => champion.name.clone(),
        };

        match self {
            MessageStyle::EmojisOnOwnLine => {
                let names = join_names(champions);
                let tokens: Vec<&str> = champions
                    .iter()
                    .filter_map(|c| emoji(c).map(String::as_str))
                    .collect();

                if tokens.is_empty() {
                    names
                } else {
                    format!("{}\n{}", names, tokens.join(" "))
                }
            }
            MessageStyle::SameLine => champions
                .iter()
                .map(with_emoji)
                .collect::<Vec<_>>()
                .join(" "),
            MessageStyle::SeparateLines => champions
                .iter()
                .map(with_emoji)
                .collect::<Vec<_>>()
                .join("\n"),
            MessageStyle::EmojisOnly => champions
                .iter()
                .map(|c| emoji(c).cloned().unwrap_or_else(|| c.name.clone()))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn join_names(champions: &[Champion]) -> String {
    champions
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
