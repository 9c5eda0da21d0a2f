//! Jolly Bot
//!
//! Replaces skull reactions from a configured set of users with the
//! jollyskull in one Discord channel, both live and across message history
//! back to a fixed cutoff. Skull-only messages from those users are deleted.

mod config;
mod convert;
mod errors;
mod handlers;
mod session;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use jolly_core::Engine;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::handlers::{EngineKey, Handler};
use crate::session::SerenitySession;

/// Jolly Bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/jolly-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jolly_bot=debug,jolly_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jolly Bot");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };
    if let Some(bot_token) = args.bot_token {
        config.discord.bot_token = bot_token;
    }
    config.validate()?;

    info!(
        channel = %config.discord.channel_name,
        targets = config.discord.target_user_ids.len(),
        "Watching for skulls"
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // The engine shares serenity's HTTP client and its ratelimiter.
    let engine = Arc::new(Engine::new(
        config.settings(),
        SerenitySession::new(client.http.clone()),
    ));
    {
        let mut data = client.data.write().await;
        data.insert::<EngineKey>(engine.clone());
    }

    // Graceful shutdown: stop the backfill, then close all shards.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    tokio::signal::ctrl_c().await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        engine.shutdown();
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Blocks until all shards are stopped
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Jolly Bot stopped");
    Ok(())
}
