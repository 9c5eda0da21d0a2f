//! Conversion between serenity models and the engine's snapshots.

#[path = "convert_tests.rs"]
mod convert_tests;

use chrono::DateTime;
use jolly_core::{Channel, ChannelKind, EmojiDescriptor, Message, ReactionEvent, ReactionSummary};
use serenity::model::channel::{
    ChannelType, GuildChannel, Message as SerenityMessage, Reaction, ReactionType,
};
use serenity::model::id::EmojiId;

pub fn emoji_descriptor(reaction: &ReactionType) -> Option<EmojiDescriptor> {
    match reaction {
        ReactionType::Custom { id, name, .. } => Some(EmojiDescriptor::custom(
            name.clone().unwrap_or_default(),
            id.get(),
        )),
        ReactionType::Unicode(glyph) => Some(EmojiDescriptor::unicode(glyph.clone())),
        _ => None,
    }
}

/// Parse an emoji API string into a serenity ReactionType.
///
/// Supports:
/// - Unicode emoji: `💀`
/// - Custom emoji: `name:id` (e.g., `jollyskull:123456789`)
pub fn parse_reaction_type(emoji: &str) -> ReactionType {
    if let Some((name, id_str)) = emoji.split_once(':') {
        if let Ok(id) = id_str.parse::<u64>() {
            return ReactionType::Custom {
                animated: false,
                id: EmojiId::new(id),
                name: Some(name.to_string()),
            };
        }
    }
    ReactionType::Unicode(emoji.to_string())
}

pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        _ => ChannelKind::Other,
    }
}

pub fn convert_channel(channel: &GuildChannel) -> Channel {
    Channel {
        id: channel.id.get(),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind),
    }
}

pub fn convert_message(msg: &SerenityMessage) -> Message {
    let reactions = msg
        .reactions
        .iter()
        .filter_map(|r| {
            emoji_descriptor(&r.reaction_type).map(|emoji| ReactionSummary {
                emoji,
                count: r.count,
            })
        })
        .collect();

    Message {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_id: Some(msg.author.id.get()),
        content: msg.content.clone(),
        timestamp: DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0).unwrap_or_default(),
        reactions,
    }
}

/// `None` for reaction kinds the engine cannot address.
pub fn convert_reaction(reaction: &Reaction) -> Option<ReactionEvent> {
    Some(ReactionEvent {
        channel_id: reaction.channel_id.get(),
        message_id: reaction.message_id.get(),
        user_id: reaction.user_id.map(|u| u.get()),
        emoji: emoji_descriptor(&reaction.emoji)?,
    })
}
