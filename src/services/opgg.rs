// src/services/opgg.rs

//! Champion role scraper.
//!
//! Reads the statistics page navigation, where every champion link ends with
//! `/{champion}/{role}`. Champions without a main role have links that do not
//! match and are simply left out of the map.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ClassificationConfig, Role, RoleMap};
use crate::services::ClassificationSource;
use crate::utils::http::ensure_success;

/// Scraper for the role classification page.
pub struct OpggScraper {
    client: Client,
    url: String,
    link_selector: Selector,
    href_pattern: Regex,
}

impl OpggScraper {
    /// Create a scraper, compiling the configured selector and pattern.
    pub fn new(client: Client, config: &ClassificationConfig) -> Result<Self> {
        let link_selector = Selector::parse(&config.link_selector)
            .map_err(|e| AppError::selector(&config.link_selector, format!("{e:?}")))?;
        let href_pattern = Regex::new(&config.href_pattern)
            .map_err(|e| AppError::config(format!("Invalid classification pattern: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            link_selector,
            href_pattern,
        })
    }

    /// Extract champion roles from the statistics page markup.
    pub fn parse_roles(&self, html: &str) -> Result<RoleMap> {
        let document = Html::parse_document(html);
        let mut links = document.select(&self.link_selector).peekable();

        if links.peek().is_none() {
            return Err(AppError::scrape(
                "Invalid HTML received, champion navigation not found (possibly changed)",
            ));
        }

        let mut roles = RoleMap::new();
        for link in links {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(caps) = self.href_pattern.captures(href) else {
                continue;
            };

            match (caps.name("name"), caps.name("role")) {
                (Some(name), Some(role)) => {
                    roles.insert(name.as_str(), Role::classify(role.as_str()));
                }
                _ => return Err(AppError::scrape(format!("Unexpected champion link: {href}"))),
            }
        }

        Ok(roles)
    }
}

#[async_trait]
impl ClassificationSource for OpggScraper {
    async fn classification(&self) -> Result<RoleMap> {
        let response = ensure_success("OP.GG", self.client.get(&self.url).send().await?).await?;
        let html = response.text().await?;
        let roles = self.parse_roles(&html)?;

        log::info!("Fetched champion roles");
        log::debug!("Classified {} champions", roles.len());

        Ok(roles)
    }
}
