//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Discord bot credentials and channels
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Riot API credentials and endpoints
    #[serde(default)]
    pub riot: RiotConfig,

    /// Role classification source
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Announcement behavior
    #[serde(default)]
    pub bot: BotConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Override secrets and channel ids from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override secrets and channel ids from a key lookup.
    ///
    /// Unparseable channel ids are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            self.discord.token = token;
        }
        if let Some(token) = lookup("RIOT_TOKEN") {
            self.riot.token = token;
        }

        let parse_id = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    log::warn!("Ignoring {key}: '{raw}' is not a channel id");
                    None
                }
            }
        };

        if let Some(id) = parse_id("DISCORD_INFO_CHANNEL_ID") {
            self.discord.info_channel_id = id;
        }
        if let Some(id) = parse_id("DISCORD_ERROR_CHANNEL_ID") {
            self.discord.error_channel_id = id;
        }
        if let Some(id) = parse_id("DISCORD_BROKEN_LIST_CHANNEL_ID") {
            self.discord.broken_list_channel_id = Some(id);
        }
    }

    /// Validate configuration values before any side effect happens.
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(AppError::validation("discord.token is empty"));
        }
        if self.discord.info_channel_id == 0 {
            return Err(AppError::validation("discord.info_channel_id is not set"));
        }
        if self.discord.error_channel_id == 0 {
            return Err(AppError::validation("discord.error_channel_id is not set"));
        }
        if self.discord.broken_list_channel_id == Some(0) {
            return Err(AppError::validation(
                "discord.broken_list_channel_id must be > 0 when set",
            ));
        }
        if self.riot.token.trim().is_empty() {
            return Err(AppError::validation("riot.token is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        for (key, value) in [
            ("discord.api_url", &self.discord.api_url),
            ("riot.platform_url", &self.riot.platform_url),
            ("riot.data_url", &self.riot.data_url),
            ("classification.url", &self.classification.url),
        ] {
            url::Url::parse(value).map_err(|e| {
                AppError::validation(format!("{key} is not a valid URL: {e}"))
            })?;
        }
        if self.bot.debug.max_emojis == Some(0) {
            return Err(AppError::validation(
                "bot.debug.max_emojis must be > 0 when set",
            ));
        }
        self.classification.validate()
    }

    /// Whether the broken champion check should run at all.
    pub fn broken_list_channel(&self) -> Option<u64> {
        if self.bot.notify_when_broken {
            self.discord.broken_list_channel_id
        } else {
            None
        }
    }
}

/// Discord credentials and channel ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Channel the rotation is announced in
    #[serde(default)]
    pub info_channel_id: u64,

    /// Channel fatal errors are reported to
    #[serde(default)]
    pub error_channel_id: u64,

    /// Channel listing champions that are currently broken
    #[serde(default)]
    pub broken_list_channel_id: Option<u64>,

    /// REST API base URL
    #[serde(default = "defaults::discord_api_url")]
    pub api_url: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            info_channel_id: 0,
            error_channel_id: 0,
            broken_list_channel_id: None,
            api_url: defaults::discord_api_url(),
        }
    }
}

/// Riot API credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Developer API key
    #[serde(default)]
    pub token: String,

    /// Platform API base (serves the rotation endpoint)
    #[serde(default = "defaults::riot_platform_url")]
    pub platform_url: String,

    /// Data Dragon base (serves versions, catalog and icons)
    #[serde(default = "defaults::riot_data_url")]
    pub data_url: String,

    /// Catalog locale
    #[serde(default = "defaults::riot_locale")]
    pub locale: String,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            platform_url: defaults::riot_platform_url(),
            data_url: defaults::riot_data_url(),
            locale: defaults::riot_locale(),
        }
    }
}

/// Where and how champion roles are scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Statistics page listing every champion with its main role
    #[serde(default = "defaults::classification_url")]
    pub url: String,

    /// CSS selector for the champion links
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// Pattern applied to each link's `href`, with `name` and `role` groups
    #[serde(default = "defaults::href_pattern")]
    pub href_pattern: String,
}

impl ClassificationConfig {
    fn validate(&self) -> Result<()> {
        scraper::Selector::parse(&self.link_selector)
            .map_err(|e| AppError::selector(&self.link_selector, format!("{e:?}")))?;

        let pattern = regex::Regex::new(&self.href_pattern).map_err(|e| {
            AppError::validation(format!("classification.href_pattern is invalid: {e}"))
        })?;
        let groups: Vec<_> = pattern.capture_names().flatten().collect();
        if !groups.contains(&"name") || !groups.contains(&"role") {
            return Err(AppError::validation(
                "classification.href_pattern needs `name` and `role` groups",
            ));
        }
        Ok(())
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            url: defaults::classification_url(),
            link_selector: defaults::link_selector(),
            href_pattern: defaults::href_pattern(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent icon downloads
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Announcement behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Also assemble the rotation for new accounts
    #[serde(default)]
    pub show_low_level_rotation: bool,

    /// Prefix the announcement with `@everyone`
    #[serde(default = "defaults::enabled")]
    pub mention_everyone: bool,

    /// Warn when a rotating champion is on the broken list
    #[serde(default = "defaults::enabled")]
    pub notify_when_broken: bool,

    /// How many recent broken-list messages to read (0 disables the check)
    #[serde(default = "defaults::broken_list_limit")]
    pub broken_list_limit: i64,

    #[serde(default)]
    pub debug: DebugConfig,

    #[serde(default)]
    pub format: FormatConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            show_low_level_rotation: false,
            mention_everyone: true,
            notify_when_broken: true,
            broken_list_limit: defaults::broken_list_limit(),
            debug: DebugConfig::default(),
            format: FormatConfig::default(),
        }
    }
}

/// Switches for testing against a staging server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Publish even when the announcement is up to date
    #[serde(default)]
    pub always_send_rotation: bool,

    /// Upload champion icons as emojis
    #[serde(default = "defaults::enabled")]
    pub send_emojis: bool,

    /// Upload at most this many emojis (avoids rate limits while testing)
    #[serde(default)]
    pub max_emojis: Option<usize>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            always_send_rotation: false,
            send_emojis: true,
            max_emojis: None,
        }
    }
}

/// How champions are joined inside a role field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStyle {
    /// Names on one line, emojis on the next
    EmojisOnOwnLine,
    /// Emoji directly before each name
    #[default]
    SameLine,
    /// One champion per line
    SeparateLines,
    /// Emojis only, falling back to the name
    EmojisOnly,
}

/// Announcement appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Embed title
    #[serde(default = "defaults::new_rotation_message")]
    pub new_rotation_message: String,

    /// Embed accent color
    #[serde(default = "defaults::embed_color")]
    pub embed_color: u32,

    /// Color applied to the bot's own role
    #[serde(default = "defaults::embed_color")]
    pub role_color: u32,

    /// Embed thumbnail
    #[serde(default = "defaults::embed_thumbnail_url")]
    pub embed_thumbnail_url: Option<String>,

    #[serde(default)]
    pub message_style: MessageStyle,

    /// Warnings shown when a broken champion is rotating
    #[serde(default = "defaults::broken_messages")]
    pub broken_messages: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            new_rotation_message: defaults::new_rotation_message(),
            embed_color: defaults::embed_color(),
            role_color: defaults::embed_color(),
            embed_thumbnail_url: defaults::embed_thumbnail_url(),
            message_style: MessageStyle::default(),
            broken_messages: defaults::broken_messages(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Discord defaults
    pub fn discord_api_url() -> String {
        "https://discord.com/api/v10".into()
    }

    // Riot defaults
    pub fn riot_platform_url() -> String {
        "https://euw1.api.riotgames.com/lol".into()
    }
    pub fn riot_data_url() -> String {
        "https://ddragon.leagueoflegends.com".into()
    }
    pub fn riot_locale() -> String {
        "en_US".into()
    }

    // Classification defaults
    pub fn classification_url() -> String {
        "https://euw.op.gg/champion/statistics".into()
    }
    pub fn link_selector() -> String {
        "aside nav a".into()
    }
    pub fn href_pattern() -> String {
        r"^/champion/(?P<name>[^/]+)/statistics/(?P<role>[^/]+)$".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; rotation-bot/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        8
    }

    // Bot defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn broken_list_limit() -> i64 {
        4
    }

    // Format defaults
    pub fn new_rotation_message() -> String {
        "New champion rotation!".into()
    }
    pub fn embed_color() -> u32 {
        0x3a7c85
    }
    pub fn embed_thumbnail_url() -> Option<String> {
        Some("https://wallpaperaccess.com/full/3829550.jpg".into())
    }
    pub fn broken_messages() -> Vec<String> {
        vec![
            "A broken champion is free this week, good luck out there".into(),
            "Brace yourselves, something broken is in the rotation".into(),
        ]
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.discord.token = "discord".into();
        config.discord.info_channel_id = 1337;
        config.discord.error_channel_id = 404;
        config.riot.token = "riot".into();
        config
    }

    #[test]
    fn validate_complete_config_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_default_config() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_channels() {
        let mut config = valid_config();
        config.discord.info_channel_id = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.discord.broken_list_channel_id = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = valid_config();
        config.http.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_pattern_without_groups() {
        let mut config = valid_config();
        config.classification.href_pattern = r"^/champion/(.*)$".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_url() {
        let mut config = valid_config();
        config.riot.data_url = "ddragon.leagueoflegends.com".into();
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = valid_config();
        config.classification.link_selector = "[[invalid".into();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config = Config::parse(
            r#"
            [discord]
            token = "abc"
            info_channel_id = 1
            error_channel_id = 2

            [bot.format]
            message_style = "EmojisOnly"

            [bot.debug]
            max_emojis = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.api_url, "https://discord.com/api/v10");
        assert_eq!(config.bot.format.message_style, MessageStyle::EmojisOnly);
        assert_eq!(config.bot.format.embed_color, 0x3a7c85);
        assert_eq!(config.bot.debug.max_emojis, Some(3));
        assert!(config.bot.debug.send_emojis);
        assert!(config.bot.mention_everyone);
        assert_eq!(config.bot.broken_list_limit, 4);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[riot]\ntoken = \"RGAPI-test\"\nlocale = \"fr_FR\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.riot.token, "RGAPI-test");
        assert_eq!(config.riot.locale, "fr_FR");
    }

    #[test]
    fn load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn overrides_replace_secrets_and_ids() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "DISCORD_TOKEN" => Some("from-env".into()),
            "DISCORD_INFO_CHANNEL_ID" => Some("77".into()),
            "DISCORD_ERROR_CHANNEL_ID" => Some("not-a-number".into()),
            "DISCORD_BROKEN_LIST_CHANNEL_ID" => Some("99".into()),
            _ => None,
        });

        assert_eq!(config.discord.token, "from-env");
        assert_eq!(config.discord.info_channel_id, 77);
        assert_eq!(config.discord.error_channel_id, 0);
        assert_eq!(config.discord.broken_list_channel_id, Some(99));
        assert!(config.riot.token.is_empty());
    }

    #[test]
    fn broken_list_channel_respects_switch() {
        let mut config = valid_config();
        config.discord.broken_list_channel_id = Some(5);
        assert_eq!(config.broken_list_channel(), Some(5));

        config.bot.notify_when_broken = false;
        assert_eq!(config.broken_list_channel(), None);
    }
}
