//! Champion roles and their classification from free-text labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::CaseInsensitiveMap;

/// Lane a champion is usually played in.
///
/// The declaration order is the canonical publish order: announcement fields
/// are emitted in it and the staleness check relies on it, so `Ord` is
/// derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Bottom,
    Support,
    Unknown,
}

impl Role {
    /// The five roles that always get a bucket when classification is available.
    pub const NAMED: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Bottom, Role::Support];

    /// Map a free-text role label to a role. Never fails; anything
    /// unrecognized becomes [`Role::Unknown`].
    pub fn classify(label: &str) -> Role {
        match label.trim().to_lowercase().as_str() {
            "top" => Role::Top,
            "jungle" | "jungler" => Role::Jungle,
            "mid" | "middle" => Role::Mid,
            "bot" | "bottom" | "adc" => Role::Bottom,
            "support" | "supp" => Role::Support,
            _ => Role::Unknown,
        }
    }

    /// Label used as the announcement field name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Bottom => "Bottom",
            Role::Support => "Support",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Champion id to role lookup, case-insensitive on the id.
pub type RoleMap = CaseInsensitiveMap<Role>;
