//! Champion and rotation data structures.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::Role;
use crate::utils::emoji_safe;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
    /// Catalog id (e.g. `MonkeyKing`), case-sensitive at the source
    pub id: String,

    /// Numeric key used by the rotation endpoint
    pub key: u32,

    /// Display name, whitespace-stripped once assembled
    pub name: String,

    /// PNG icon, fetched only for rotating champions
    #[serde(skip)]
    pub icon: Option<Vec<u8>>,
}

impl Champion {
    pub fn new(id: impl Into<String>, key: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key,
            name: name.into(),
            icon: None,
        }
    }

    /// Name projected onto the characters an emoji name may carry.
    pub fn emoji_name(&self) -> String {
        emoji_safe(&self.name)
    }
}

/// Full catalog keyed by champion id.
pub type Catalog = BTreeMap<String, Champion>;

/// Champions grouped by role, iterated in canonical role order.
pub type RoleBuckets = BTreeMap<Role, Vec<Champion>>;

/// Numeric keys of the champions currently free to play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationIds {
    pub current: BTreeSet<u32>,
    pub low_level: BTreeSet<u32>,
}

/// The current rotation, grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    /// Every champion in the catalog
    pub all_champions: Vec<Champion>,

    /// Rotating champions by role
    pub by_role: RoleBuckets,

    /// Rotation for new (low level) accounts, when requested
    pub by_role_low_level: Option<RoleBuckets>,
}

impl Rotation {
    /// Rotating champions in publish order.
    pub fn champions(&self) -> impl Iterator<Item = &Champion> {
        self.by_role.values().flatten()
    }

    pub fn champion_count(&self) -> usize {
        self.by_role.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_name() {
        assert_eq!(Champion::new("Nunu", 20, "Nunu&Willump").emoji_name(), "NunuWillump");
        assert_eq!(Champion::new("Draven", 119, "Draven").emoji_name(), "Draven");
    }

    #[test]
    fn test_champions_follow_role_order() {
        let mut by_role = RoleBuckets::new();
        by_role.insert(Role::Support, vec![Champion::new("Nami", 267, "Nami")]);
        by_role.insert(Role::Top, vec![Champion::new("Lulu", 117, "Lulu")]);

        let rotation = Rotation {
            by_role,
            ..Default::default()
        };

        let names: Vec<_> = rotation.champions().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lulu", "Nami"]);
        assert_eq!(rotation.champion_count(), 2);
    }
}
