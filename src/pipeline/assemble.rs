// src/pipeline/assemble.rs

//! Rotation assembly.
//!
//! Joins the rotating ids, the catalog and the role classification into one
//! [`Rotation`]. Classification failures and catalog skew are tolerated.

use std::collections::{BTreeSet, HashMap};

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Catalog, Champion, Role, RoleBuckets, RoleMap, Rotation};
use crate::services::{CatalogSource, ClassificationSource};
use crate::utils::strip_whitespace;

/// What to assemble besides the current rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssembleOptions {
    /// Download icons for the rotating champions
    pub icons: bool,
    /// Also group the rotation for new accounts
    pub low_level: bool,
}

/// Builds a [`Rotation`] from its upstream sources.
pub struct RotationAssembler<'a> {
    catalog: &'a dyn CatalogSource,
    classification: &'a dyn ClassificationSource,
}

impl<'a> RotationAssembler<'a> {
    pub fn new(catalog: &'a dyn CatalogSource, classification: &'a dyn ClassificationSource) -> Self {
        Self {
            catalog,
            classification,
        }
    }

    /// Fetch every source and assemble the rotation.
    ///
    /// Only the rotation ids and the catalog are required; without a
    /// classification every champion ends up in the `Unknown` bucket.
    pub async fn assemble(&self, options: AssembleOptions) -> Result<Rotation> {
        let ids = self.catalog.rotating_ids().await?;
        let catalog = strip_names(self.catalog.catalog().await?);

        let roles = match self.classification.classification().await {
            Ok(roles) => Some(roles),
            Err(e) => {
                log::warn!("Role classification unavailable, continuing without roles: {}", e);
                None
            }
        };

        let mut current = rotating(&catalog, &ids.current);
        if options.icons {
            self.fetch_icons(&mut current).await;
        }

        let by_role_low_level = options
            .low_level
            .then(|| group_by_role(rotating(&catalog, &ids.low_level), roles.as_ref()));

        Ok(Rotation {
            all_champions: catalog.into_values().collect(),
            by_role: group_by_role(current, roles.as_ref()),
            by_role_low_level,
        })
    }

    /// Download icons concurrently; a failed download leaves that champion
    /// without an icon.
    async fn fetch_icons(&self, champions: &mut [Champion]) {
        let catalog = self.catalog;
        let ids: Vec<String> = champions.iter().map(|c| c.id.clone()).collect();

        let mut icons: HashMap<String, Result<Vec<u8>>> = stream::iter(ids)
            .map(|id| async move {
                let result = catalog.icon(&id).await;
                (id, result)
            })
            .buffer_unordered(catalog.icon_concurrency().max(1))
            .collect()
            .await;

        let mut fetched = 0;
        for champion in champions.iter_mut() {
            match icons.remove(&champion.id) {
                Some(Ok(bytes)) => {
                    champion.icon = Some(bytes);
                    fetched += 1;
                }
                Some(Err(e)) => {
                    log::warn!("Failed to fetch icon for {}: {}", champion.id, e);
                }
                None => {}
            }
        }

        log::info!("Fetched {}/{} champion icons", fetched, champions.len());
    }
}

/// Remove whitespace from every display name.
fn strip_names(catalog: Catalog) -> Catalog {
    catalog
        .into_iter()
        .map(|(id, mut champion)| {
            champion.name = strip_whitespace(&champion.name);
            (id, champion)
        })
        .collect()
}

/// Catalog entries whose key is rotating. Ids missing from the catalog are
/// dropped.
fn rotating(catalog: &Catalog, keys: &BTreeSet<u32>) -> Vec<Champion> {
    let champions: Vec<Champion> = catalog
        .values()
        .filter(|champion| keys.contains(&champion.key))
        .cloned()
        .collect();

    if champions.len() < keys.len() {
        log::debug!(
            "{} rotating ids have no catalog entry",
            keys.len() - champions.len()
        );
    }

    champions
}

/// Group champions by their classified role.
///
/// Without a classification everything goes into one `Unknown` bucket.
/// Otherwise the five named roles are always present and `Unknown` only
/// when some champion has no role.
pub fn group_by_role(champions: Vec<Champion>, roles: Option<&RoleMap>) -> RoleBuckets {
    let Some(roles) = roles else {
        return RoleBuckets::from([(Role::Unknown, champions)]);
    };

    let mut buckets: RoleBuckets = Role::NAMED.iter().map(|role| (*role, Vec::new())).collect();
    for champion in champions {
        let role = roles.get(&champion.id).copied().unwrap_or(Role::Unknown);
        buckets.entry(role).or_default().push(champion);
    }

    buckets
}
