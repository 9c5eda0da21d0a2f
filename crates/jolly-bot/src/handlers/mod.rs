//! Serenity event handler implementation

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::convert::{convert_message, convert_reaction};
use crate::session::SerenitySession;

pub type BotEngine = jolly_core::Engine<SerenitySession>;

/// Key for the engine in serenity's client data.
pub struct EngineKey;

impl TypeMapKey for EngineKey {
    type Value = Arc<BotEngine>;
}

pub struct Handler;

async fn engine(ctx: &Context) -> Option<Arc<BotEngine>> {
    let data = ctx.data.read().await;
    let engine = data.get::<EngineKey>().cloned();
    if engine.is_none() {
        error!("Engine not found in context data");
    }
    engine
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );

        let Some(engine) = engine(&ctx).await else {
            return;
        };

        // Ready fires again after a gateway reconnect.
        if engine.is_ready() {
            debug!("Channel already resolved, skipping initialization");
            return;
        }

        if let Err(e) = engine.initialize().await {
            error!(error = %e, "initialization failed");
            return;
        }

        let Some(cancel) = engine.start_backfill() else {
            return;
        };
        tokio::spawn(async move {
            let report = engine.run_backfill(&cancel).await;
            info!(
                outcome = ?report.outcome,
                processed = report.processed,
                replaced = report.replaced,
                "historical processing finished"
            );
        });
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(engine) = engine(&ctx).await else {
            return;
        };
        engine.handle_message(&convert_message(&msg)).await;
    }

    async fn reaction_add(&self, ctx: Context, add_reaction: Reaction) {
        let Some(event) = convert_reaction(&add_reaction) else {
            return;
        };
        let Some(engine) = engine(&ctx).await else {
            return;
        };
        engine.handle_reaction(&event).await;
    }
}
