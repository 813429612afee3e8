// src/services/connect.rs

//! Builds the production collaborators from configuration.

use reqwest::Client;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::RotationContext;
use crate::services::{Alerter, ChatChannel, DiscordChannel, DiscordHttp, OpggScraper, RiotClient};
use crate::utils::http::create_async_client;

/// Shared HTTP access for every collaborator.
#[derive(Clone)]
pub struct Connections {
    pub client: Client,
    pub discord: DiscordHttp,
}

impl Connections {
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let discord = DiscordHttp::new(client.clone(), &config.discord);
        Ok(Self { client, discord })
    }

    /// Alerter bound to the error channel.
    pub async fn alerter(&self, config: &Config) -> Result<Alerter> {
        let channel =
            DiscordChannel::connect(self.discord.clone(), config.discord.error_channel_id, "error")
                .await?;
        Ok(Alerter::new(Box::new(channel)))
    }

    /// Connect every collaborator a rotation run needs.
    pub async fn collaborators(&self, config: &Config) -> Result<Collaborators> {
        let info =
            DiscordChannel::connect(self.discord.clone(), config.discord.info_channel_id, "info")
                .await?;

        let broken_list = match config.broken_list_channel() {
            Some(id) => Some(DiscordChannel::connect(self.discord.clone(), id, "broken").await?),
            None => {
                if config.bot.notify_when_broken {
                    log::info!("No broken channel ID provided");
                }
                None
            }
        };

        let riot = RiotClient::connect(self.client.clone(), &config.riot, &config.http).await?;
        let opgg = OpggScraper::new(self.client.clone(), &config.classification)?;

        Ok(Collaborators {
            riot,
            opgg,
            info,
            broken_list,
        })
    }
}

/// Production collaborators of a rotation run.
pub struct Collaborators {
    pub riot: RiotClient,
    pub opgg: OpggScraper,
    pub info: DiscordChannel,
    pub broken_list: Option<DiscordChannel>,
}

impl Collaborators {
    pub fn context<'a>(&'a self, config: &'a Config) -> RotationContext<'a> {
        RotationContext {
            config,
            catalog: &self.riot,
            classification: &self.opgg,
            channel: &self.info,
            broken_list: self.broken_list.as_ref().map(|c| c as &dyn ChatChannel),
        }
    }
}
