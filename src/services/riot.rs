// src/services/riot.rs

//! Riot API and Data Dragon client.
//!
//! The rotation comes from the platform API (needs the developer key); the
//! catalog and icons come from the Data Dragon CDN, pinned to the latest
//! version at connect time.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Catalog, Champion, HttpConfig, RiotConfig, RotationIds};
use crate::services::CatalogSource;
use crate::utils::http::ensure_success;

const SERVICE: &str = "Riot";

const VERSIONS_ENDPOINT: &str = "api/versions.json";
const ROTATION_ENDPOINT: &str = "platform/v3/champion-rotations";
const TOKEN_HEADER: &str = "X-Riot-Token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RotationResponse {
    free_champion_ids: Vec<u32>,
    #[serde(default)]
    free_champion_ids_for_new_players: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct ChampionListResponse {
    data: BTreeMap<String, ChampionDto>,
}

#[derive(Debug, Deserialize)]
struct ChampionDto {
    id: String,
    key: String,
    name: String,
}

/// Client for the champion rotation and catalog.
pub struct RiotClient {
    client: Client,
    config: RiotConfig,
    version: String,
    max_concurrent: usize,
}

impl RiotClient {
    /// Create a client pinned to the latest Data Dragon version.
    pub async fn connect(client: Client, config: &RiotConfig, http: &HttpConfig) -> Result<Self> {
        let version = Self::latest_version(&client, &config.data_url).await?;
        log::debug!("Fetched latest Data Dragon version {}", version);

        Ok(Self::with_version(client, config, http, version))
    }

    /// Create a client for a known Data Dragon version.
    pub fn with_version(
        client: Client,
        config: &RiotConfig,
        http: &HttpConfig,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            config: config.clone(),
            version: version.into(),
            max_concurrent: http.max_concurrent.max(1),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    async fn latest_version(client: &Client, data_url: &str) -> Result<String> {
        let url = format!("{}/{}", data_url.trim_end_matches('/'), VERSIONS_ENDPOINT);
        let response = ensure_success(SERVICE, client.get(&url).send().await?).await?;
        let versions: Vec<String> = response.json().await?;

        versions
            .into_iter()
            .next()
            .ok_or_else(|| AppError::api(SERVICE, 200, url, "no Data Dragon version listed"))
    }

    fn cdn_url(&self, path: &str) -> String {
        format!(
            "{}/cdn/{}/{}",
            self.config.data_url.trim_end_matches('/'),
            self.version,
            path
        )
    }

    fn catalog_url(&self) -> String {
        self.cdn_url(&format!("data/{}/champion.json", self.config.locale))
    }

    fn icon_url(&self, id: &str) -> String {
        self.cdn_url(&format!("img/champion/{id}.png"))
    }

    fn rotation_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.platform_url.trim_end_matches('/'),
            ROTATION_ENDPOINT
        )
    }
}

#[async_trait]
impl CatalogSource for RiotClient {
    async fn rotating_ids(&self) -> Result<RotationIds> {
        let request = self
            .client
            .get(self.rotation_url())
            .header(TOKEN_HEADER, &self.config.token);
        let response = ensure_success(SERVICE, request.send().await?).await?;
        let rotation: RotationResponse = response.json().await?;

        log::info!("Fetched rotation champions' ids");
        log::debug!("Free rotation ids: {:?}", rotation.free_champion_ids);

        Ok(rotation.into())
    }

    async fn catalog(&self) -> Result<Catalog> {
        let response = ensure_success(SERVICE, self.client.get(self.catalog_url()).send().await?)
            .await?;
        let list: ChampionListResponse = response.json().await?;
        let catalog = parse_catalog(list);

        log::info!("Fetched all champions");
        log::debug!("Champion count: {}", catalog.len());

        Ok(catalog)
    }

    async fn icon(&self, id: &str) -> Result<Vec<u8>> {
        let response = ensure_success(SERVICE, self.client.get(self.icon_url(id)).send().await?)
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn icon_concurrency(&self) -> usize {
        self.max_concurrent
    }
}

impl From<RotationResponse> for RotationIds {
    fn from(response: RotationResponse) -> Self {
        Self {
            current: response.free_champion_ids.into_iter().collect(),
            low_level: response
                .free_champion_ids_for_new_players
                .into_iter()
                .collect(),
        }
    }
}

/// Convert the Data Dragon payload, dropping entries whose key is not numeric.
fn parse_catalog(list: ChampionListResponse) -> Catalog {
    list.data
        .into_values()
        .filter_map(|dto| match dto.key.parse::<u32>() {
            Ok(key) => Some((dto.id.clone(), Champion::new(dto.id, key, dto.name))),
            Err(_) => {
                log::warn!("Skipping champion {} with invalid key '{}'", dto.id, dto.key);
                None
            }
        })
        .collect()
}
