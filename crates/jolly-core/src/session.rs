//! Platform capability consumed by the engine.
//!
//! Rate-limit handling, retries and timeouts belong to the implementation;
//! the engine treats every failure as final for that call.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Channel, Message};

/// Chat platform operations the engine needs.
///
/// Emoji are passed as API strings (see
/// [`EmojiDescriptor::api_string`](crate::EmojiDescriptor::api_string)).
#[async_trait]
pub trait Session: Send + Sync {
    /// All channels of a guild, in platform order.
    async fn list_channels(&self, guild_id: u64) -> Result<Vec<Channel>>;

    /// Up to `limit` messages strictly older than `before`, newest first.
    /// `before == None` starts from the most recent message.
    async fn list_messages(
        &self,
        channel_id: u64,
        limit: u8,
        before: Option<u64>,
    ) -> Result<Vec<Message>>;

    /// Up to `limit` user IDs that reacted with `emoji`, strictly after
    /// `after` in the platform's ordering.
    async fn list_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        limit: u8,
        after: Option<u64>,
    ) -> Result<Vec<u64>>;

    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> Result<()>;

    /// Adds the bot's own reaction. Adding an existing reaction is a no-op.
    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()>;
}
