// src/pipeline/compare.rs

//! Staleness check against the last announcement.
//!
//! The announcement is the only record of what was published, so its fields
//! are read back and compared with the fresh rotation. Names only have to
//! appear in the field text, either as-is or in their emoji-safe form, since
//! the rendered text may hold emoji tokens instead of names.

use std::fmt;

use crate::error::Result;
use crate::models::{ChannelMessage, Champion, Role, Rotation};
use crate::storage::AnnouncementStore;
use crate::utils::has_letters;

/// Role fields read back from a published announcement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementState {
    /// `(label, text)` pairs in published order
    pub fields: Vec<(String, String)>,
}

impl AnnouncementState {
    /// Keep only fields whose label has letters; the broken champion notice
    /// uses an invisible label and is not a role.
    pub fn from_message(message: &ChannelMessage) -> Self {
        Self {
            fields: message
                .fields()
                .iter()
                .filter(|field| has_letters(&field.name))
                .map(|field| (field.name.clone(), field.value.clone()))
                .collect(),
        }
    }

    fn text_for(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, text)| text.as_str())
    }
}

/// Outcome of comparing a rotation with the last announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    UpToDate,
    /// Channel empty or last message not ours
    NoAnnouncement,
    NoFields,
    RoleCount { expected: usize, found: usize },
    MissingRole(Role),
    MissingChampion { role: Role, champion: String },
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::UpToDate)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::UpToDate => write!(f, "announcement is up to date"),
            Staleness::NoAnnouncement => write!(f, "no announcement of ours in the channel"),
            Staleness::NoFields => write!(f, "last announcement has no fields"),
            Staleness::RoleCount { expected, found } => {
                write!(f, "expected {expected} role fields, found {found}")
            }
            Staleness::MissingRole(role) => write!(f, "no field for {role}"),
            Staleness::MissingChampion { role, champion } => {
                write!(f, "{champion} missing from {role}")
            }
        }
    }
}

/// Compare `rotation` with the last announcement, if any.
pub fn check_staleness(rotation: &Rotation, last: Option<&ChannelMessage>) -> Staleness {
    let Some(message) = last else {
        return Staleness::NoAnnouncement;
    };
    if message.fields().is_empty() {
        return Staleness::NoFields;
    }

    let state = AnnouncementState::from_message(message);
    if state.fields.len() != rotation.by_role.len() {
        return Staleness::RoleCount {
            expected: rotation.by_role.len(),
            found: state.fields.len(),
        };
    }

    for (role, champions) in &rotation.by_role {
        let Some(text) = state.text_for(role.display_name()) else {
            return Staleness::MissingRole(*role);
        };
        if let Some(missing) = champions.iter().find(|c| !mentions(text, c)) {
            return Staleness::MissingChampion {
                role: *role,
                champion: missing.name.clone(),
            };
        }
    }

    Staleness::UpToDate
}

fn mentions(text: &str, champion: &Champion) -> bool {
    text.contains(&champion.name) || text.contains(&champion.emoji_name())
}

/// Compare `rotation` with the announcement held by `store`.
pub async fn stored_staleness(
    rotation: &Rotation,
    store: &dyn AnnouncementStore,
) -> Result<Staleness> {
    let last = store.read_last_announcement().await?;
    let staleness = check_staleness(rotation, last.as_ref());

    log::info!("Staleness check: {}", staleness);
    Ok(staleness)
}
