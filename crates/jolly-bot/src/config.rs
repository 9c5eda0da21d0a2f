//! Configuration management for jolly-bot

#[path = "config_tests.rs"]
mod config_tests;

use anyhow::{bail, Context, Result};
use jolly_core::{Membership, Settings};
use serde::Deserialize;
use std::fs;

const DEFAULT_CHANNEL_NAME: &str = "jollyposting";

/// Source of environment variables. Lets tests supply an in-memory map.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordBotConfig,
}

/// Discord bot specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordBotConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
    /// Server to operate in
    pub guild_id: u64,
    /// Name of the text channel to watch
    #[serde(default = "default_channel_name")]
    pub channel_name: String,
    /// Users whose skulls get replaced
    #[serde(default)]
    pub target_user_ids: Vec<u64>,
    /// Substitute emoji as `name:id`
    #[serde(default)]
    pub jollyskull_id: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&SystemEnv)
    }

    pub fn from_reader(env: &impl ReadEnv) -> Result<Self> {
        let var = |key: &str| env.var(key).filter(|v| !v.is_empty());

        let bot_token = var("DISCORD_TOKEN").context("DISCORD_TOKEN is required")?;

        let guild_id = var("DISCORD_GUILD_ID")
            .context("DISCORD_GUILD_ID is required")?
            .trim()
            .parse::<u64>()
            .context("DISCORD_GUILD_ID must be a numeric ID")?;

        let channel_name =
            var("DISCORD_CHANNEL_NAME").unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string());

        // The singular variable is the deprecated spelling.
        let target_user_ids = match var("DISCORD_TARGET_USER_IDS") {
            Some(ids) => parse_id_list("DISCORD_TARGET_USER_IDS", &ids)?,
            None => match var("DISCORD_TARGET_USER_ID") {
                Some(ids) => parse_id_list("DISCORD_TARGET_USER_ID", &ids)?,
                None => Vec::new(),
            },
        };
        if target_user_ids.is_empty() {
            bail!("DISCORD_TARGET_USER_IDS is required");
        }

        let jollyskull_id =
            var("DISCORD_JOLLYSKULL_ID").context("DISCORD_JOLLYSKULL_ID is required")?;

        Ok(Config {
            discord: DiscordBotConfig {
                bot_token,
                guild_id,
                channel_name,
                target_user_ids,
                jollyskull_id,
            },
        })
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        let discord = &self.discord;
        if discord.bot_token.is_empty() {
            bail!("bot token is required");
        }
        if discord.guild_id == 0 {
            bail!("guild ID must be non-zero");
        }
        if discord.channel_name.is_empty() {
            bail!("channel name must not be empty");
        }
        if discord.target_user_ids.is_empty() {
            bail!("at least one target user ID is required");
        }
        if discord.target_user_ids.contains(&0) {
            bail!("target user IDs must be non-zero");
        }
        if discord.jollyskull_id.is_empty() {
            bail!("jollyskull emoji ID is required");
        }
        Ok(())
    }

    /// Engine settings derived from this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            guild_id: self.discord.guild_id,
            channel_name: self.discord.channel_name.clone(),
            targets: Membership::new(self.discord.target_user_ids.iter().copied()),
            substitute_emoji: self.discord.jollyskull_id.clone(),
        }
    }
}

fn default_channel_name() -> String {
    DEFAULT_CHANNEL_NAME.to_string()
}

fn parse_id_list(key: &str, s: &str) -> Result<Vec<u64>> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| {
            x.parse::<u64>()
                .with_context(|| format!("{} contains an invalid user ID: {}", key, x))
        })
        .collect()
}
