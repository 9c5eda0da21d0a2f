//! `Session` implementation backed by serenity's HTTP client.
//!
//! Serenity's built-in ratelimiter queues requests per route, so the
//! engine never sees a 429 unless the limiter itself gives up.

use std::sync::Arc;

use async_trait::async_trait;
use jolly_core::{Channel, Message, Result, Session};
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};

use crate::convert::{convert_channel, convert_message, parse_reaction_type};
use crate::errors::classify;

#[derive(Clone)]
pub struct SerenitySession {
    http: Arc<Http>,
}

impl SerenitySession {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Session for SerenitySession {
    async fn list_channels(&self, guild_id: u64) -> Result<Vec<Channel>> {
        let channels = self
            .http
            .get_channels(GuildId::new(guild_id))
            .await
            .map_err(|e| classify("list_channels", &e))?;
        Ok(channels.iter().map(convert_channel).collect())
    }

    async fn list_messages(
        &self,
        channel_id: u64,
        limit: u8,
        before: Option<u64>,
    ) -> Result<Vec<Message>> {
        let mut query = GetMessages::new().limit(limit);
        if let Some(before) = before {
            query = query.before(MessageId::new(before));
        }

        let messages = ChannelId::new(channel_id)
            .messages(&*self.http, query)
            .await
            .map_err(|e| classify("list_messages", &e))?;
        Ok(messages.iter().map(convert_message).collect())
    }

    async fn list_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        limit: u8,
        after: Option<u64>,
    ) -> Result<Vec<u64>> {
        let users = self
            .http
            .get_reaction_users(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &parse_reaction_type(emoji),
                limit,
                after,
            )
            .await
            .map_err(|e| classify("list_reactors", &e))?;
        Ok(users.iter().map(|u| u.id.get()).collect())
    }

    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> Result<()> {
        self.http
            .delete_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                UserId::new(user_id),
                &parse_reaction_type(emoji),
            )
            .await
            .map_err(|e| classify("remove_reaction", &e))
    }

    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()> {
        self.http
            .create_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &parse_reaction_type(emoji),
            )
            .await
            .map_err(|e| classify("add_reaction", &e))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.http
            .delete_message(ChannelId::new(channel_id), MessageId::new(message_id), None)
            .await
            .map_err(|e| classify("delete_message", &e))
    }
}
