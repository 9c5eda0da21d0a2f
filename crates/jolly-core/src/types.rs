//! Platform snapshots consumed by the engine.
//!
//! All identifiers are Discord snowflakes.

use chrono::{DateTime, Utc};

/// An emoji as carried by a reaction.
///
/// `id == None` means a standard unicode emoji identified by `name`;
/// otherwise a guild custom emoji identified by `name:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmojiDescriptor {
    pub name: String,
    pub id: Option<u64>,
}

impl EmojiDescriptor {
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn custom(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

/// Aggregated reaction entry on a message (one per distinct emoji).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionSummary {
    pub emoji: EmojiDescriptor,
    pub count: u64,
}

/// Read-only message snapshot. Used both for history pages and for
/// live message-create events.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub channel_id: u64,
    /// `None` for system or webhook payloads without a user author.
    pub author_id: Option<u64>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub reactions: Vec<ReactionSummary>,
}

/// A live reaction-add event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: Option<u64>,
    pub emoji: EmojiDescriptor,
}
