//! Channel resolution, live event filters and reaction reconciliation.

#[path = "engine_tests.rs"]
mod engine_tests;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backfill::historical_cutoff;
use crate::clock::{Clock, SystemClock};
use crate::emoji::{is_skull_emoji, is_skull_only_content};
use crate::error::{log_failure, Error, Result};
use crate::membership::Membership;
use crate::session::Session;
use crate::state::RuntimeState;
use crate::types::{Channel, ChannelKind, EmojiDescriptor, Message, ReactionEvent};

/// Page size for reactor and message history listings.
pub const PAGE_SIZE: u8 = 100;

/// What the engine watches and what it reacts with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub guild_id: u64,
    pub channel_name: String,
    pub targets: Membership,
    /// API string of the substitute emoji, e.g. `jollyskull:123`.
    pub substitute_emoji: String,
}

/// The replacement engine.
///
/// Shared between the gateway event handlers and the backfill task,
/// usually behind an `Arc`.
pub struct Engine<S, C = SystemClock> {
    pub(crate) session: S,
    pub(crate) clock: C,
    pub(crate) settings: Settings,
    pub(crate) state: RuntimeState,
    pub(crate) cutoff: DateTime<Utc>,
}

impl<S: Session> Engine<S> {
    pub fn new(settings: Settings, session: S) -> Self {
        Self {
            session,
            clock: SystemClock,
            settings,
            state: RuntimeState::new(),
            cutoff: historical_cutoff(),
        }
    }
}

impl<S: Session, C: Clock> Engine<S, C> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Engine<S, C2> {
        Engine {
            session: self.session,
            clock,
            settings: self.settings,
            state: self.state,
            cutoff: self.cutoff,
        }
    }

    /// Override the backfill cutoff. Messages strictly older are skipped.
    pub fn with_cutoff(mut self, cutoff: DateTime<Utc>) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn channel_id(&self) -> Option<u64> {
        self.state.channel_id()
    }

    // ── Channel resolution ─────────────────────────────────────────────────

    /// Resolve the configured channel name and become ready.
    ///
    /// Nothing is processed before this succeeds. Once a channel has been
    /// published, later calls keep it.
    pub async fn initialize(&self) -> Result<u64> {
        let channels = self.session.list_channels(self.settings.guild_id).await?;

        let channel_id = find_channel_by_name(&channels, &self.settings.channel_name)
            .ok_or_else(|| Error::ChannelNotFound(self.settings.channel_name.clone()))?;

        if !self.state.publish(channel_id) {
            debug!(channel_id, "channel already resolved");
        }

        info!(
            channel = %self.settings.channel_name,
            id = channel_id,
            "monitoring channel"
        );
        Ok(channel_id)
    }

    // ── Backfill lifecycle ─────────────────────────────────────────────────

    /// Hand out the backfill cancellation token. `None` if a backfill was
    /// already started in this process.
    pub fn start_backfill(&self) -> Option<CancellationToken> {
        self.state.begin_backfill()
    }

    /// Stop a running backfill at its next page boundary. Idempotent.
    pub fn shutdown(&self) {
        self.state.cancel();
    }

    // ── Live event filters ─────────────────────────────────────────────────

    pub fn is_target_user(&self, user_id: u64) -> bool {
        self.settings.targets.contains(user_id)
    }

    pub fn should_process_reaction(&self, event: &ReactionEvent) -> bool {
        let Some(channel_id) = self.state.channel_id() else {
            return false;
        };
        if event.channel_id != channel_id {
            return false;
        }
        if !event.user_id.is_some_and(|id| self.is_target_user(id)) {
            return false;
        }
        is_skull_emoji(&event.emoji)
    }

    pub fn should_delete_message(&self, message: &Message) -> bool {
        let Some(channel_id) = self.state.channel_id() else {
            return false;
        };
        if message.channel_id != channel_id {
            return false;
        }
        if !message.author_id.is_some_and(|id| self.is_target_user(id)) {
            return false;
        }
        is_skull_only_content(&message.content)
    }

    // ── Live event actions ─────────────────────────────────────────────────

    /// Replace a qualifying live reaction. Returns true if it was replaced.
    pub async fn handle_reaction(&self, event: &ReactionEvent) -> bool {
        if !self.should_process_reaction(event) {
            return false;
        }
        let Some(user_id) = event.user_id else {
            return false;
        };

        debug!(
            message_id = event.message_id,
            user_id,
            emoji = %event.emoji.name,
            "detected skull reaction from target user"
        );
        self.replace_reaction(event.message_id, user_id, &event.emoji)
            .await
    }

    /// Delete a qualifying skull-only message. Returns true if deleted.
    pub async fn handle_message(&self, message: &Message) -> bool {
        if !self.should_delete_message(message) {
            return false;
        }

        debug!(message_id = message.id, "detected skull-only message from target user");
        if let Err(e) = self
            .session
            .delete_message(message.channel_id, message.id)
            .await
        {
            log_failure!(e, message_id = message.id, "failed to delete message");
            return false;
        }
        info!(message_id = message.id, "deleted skull-only message");
        true
    }

    // ── Reconciliation ─────────────────────────────────────────────────────

    /// Replace every target user's skull reaction on `message`.
    /// Returns the number of successful replacements.
    pub async fn process_message_reactions(&self, message: &Message) -> usize {
        let mut replaced = 0;

        for reaction in &message.reactions {
            if !is_skull_emoji(&reaction.emoji) {
                continue;
            }

            let users = self
                .find_target_users_with_reaction(message.id, &reaction.emoji)
                .await;
            for user_id in users {
                if self.replace_reaction(message.id, user_id, &reaction.emoji).await {
                    replaced += 1;
                }
            }
        }

        replaced
    }

    /// Page through everyone who reacted with `emoji` and keep the target
    /// users. A failed page ends the walk; users found so far are kept.
    pub async fn find_target_users_with_reaction(
        &self,
        message_id: u64,
        emoji: &EmojiDescriptor,
    ) -> Vec<u64> {
        let mut found = Vec::new();
        let Some(channel_id) = self.state.channel_id() else {
            return found;
        };
        let emoji = emoji.api_string();
        let mut after = None;

        loop {
            let users = match self
                .session
                .list_reactors(channel_id, message_id, &emoji, PAGE_SIZE, after)
                .await
            {
                Ok(users) => users,
                Err(e) => {
                    log_failure!(e, message_id, emoji = %emoji, "failed to fetch reactions");
                    return found;
                }
            };

            let Some(&last) = users.last() else {
                return found;
            };

            found.extend(users.iter().copied().filter(|&id| self.is_target_user(id)));

            if users.len() < usize::from(PAGE_SIZE) {
                return found;
            }
            after = Some(last);
        }
    }

    /// Remove `user_id`'s `emoji` reaction and add the substitute.
    ///
    /// The add is only attempted after a successful remove. If the add
    /// fails the message is left without either reaction; that is logged
    /// and not retried.
    pub async fn replace_reaction(
        &self,
        message_id: u64,
        user_id: u64,
        emoji: &EmojiDescriptor,
    ) -> bool {
        let Some(channel_id) = self.state.channel_id() else {
            return false;
        };
        let emoji = emoji.api_string();

        if let Err(e) = self
            .session
            .remove_reaction(channel_id, message_id, &emoji, user_id)
            .await
        {
            log_failure!(
                e,
                message_id,
                user_id,
                emoji = %emoji,
                "failed to remove skull reaction"
            );
            return false;
        }

        if let Err(e) = self
            .session
            .add_reaction(channel_id, message_id, &self.settings.substitute_emoji)
            .await
        {
            log_failure!(e, message_id, "failed to add jollyskull reaction");
            return false;
        }

        debug!(message_id, user_id, emoji = %emoji, "replaced skull with jollyskull");
        true
    }
}

/// First text channel named exactly `name`.
pub fn find_channel_by_name(channels: &[Channel], name: &str) -> Option<u64> {
    channels
        .iter()
        .find(|ch| ch.name == name && ch.kind == ChannelKind::Text)
        .map(|ch| ch.id)
}
