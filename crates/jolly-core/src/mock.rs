//! In-memory `Session` for unit testing without a Discord connection.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::{Channel, Message};

/// One recorded call against [`MockSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListChannels {
        guild_id: u64,
    },
    ListMessages {
        channel_id: u64,
        limit: u8,
        before: Option<u64>,
    },
    ListReactors {
        channel_id: u64,
        message_id: u64,
        emoji: String,
        limit: u8,
        after: Option<u64>,
    },
    RemoveReaction {
        channel_id: u64,
        message_id: u64,
        emoji: String,
        user_id: u64,
    },
    AddReaction {
        channel_id: u64,
        message_id: u64,
        emoji: String,
    },
    DeleteMessage {
        channel_id: u64,
        message_id: u64,
    },
}

/// Scripted platform that records every call.
///
/// Clones share state, so a test can keep one handle while the engine
/// owns another.
///
/// # Example
/// ```rust,ignore
/// let session = MockSession::new()
///     .with_channels(vec![text_channel(10, "jollyposting")])
///     .with_reactors(1, "💀", vec![100, 200]);
/// let engine = Engine::new(settings, session.clone());
/// engine.initialize().await.unwrap();
/// assert_eq!(session.count(|c| matches!(c, Call::ListChannels { .. })), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockSession {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    channels: Vec<Channel>,
    channels_error: Option<String>,
    message_pages: VecDeque<std::result::Result<Vec<Message>, String>>,
    reactors: HashMap<(u64, String), Vec<u64>>,
    reactor_failures: HashMap<(u64, String), usize>,
    reactor_calls: HashMap<(u64, String), usize>,
    fail_remove: bool,
    fail_add: bool,
    fail_delete: bool,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(self, channels: Vec<Channel>) -> Self {
        self.lock().channels = channels;
        self
    }

    /// Make `list_channels` fail.
    pub fn fail_channels(self, message: &str) -> Self {
        self.lock().channels_error = Some(message.to_string());
        self
    }

    /// Queue one history page. Pages are served in order; once the queue
    /// is drained `list_messages` returns an empty page.
    pub fn push_message_page(self, page: Vec<Message>) -> Self {
        self.lock().message_pages.push_back(Ok(page));
        self
    }

    /// Queue a failing history fetch.
    pub fn push_message_error(self, message: &str) -> Self {
        self.lock().message_pages.push_back(Err(message.to_string()));
        self
    }

    /// Full reactor list for `(message_id, emoji)`, served in pages that
    /// start after the `after` cursor.
    pub fn with_reactors(self, message_id: u64, emoji: &str, users: Vec<u64>) -> Self {
        self.lock()
            .reactors
            .insert((message_id, emoji.to_string()), users);
        self
    }

    /// Let the first `pages` reactor fetches for `(message_id, emoji)`
    /// succeed and fail every one after.
    pub fn fail_reactors_after(self, message_id: u64, emoji: &str, pages: usize) -> Self {
        self.lock()
            .reactor_failures
            .insert((message_id, emoji.to_string()), pages);
        self
    }

    pub fn fail_remove(self) -> Self {
        self.lock().fail_remove = true;
        self
    }

    pub fn fail_add(self) -> Self {
        self.lock().fail_add = true;
        self
    }

    pub fn fail_delete(self) -> Self {
        self.lock().fail_delete = true;
        self
    }

    /// Snapshot of all recorded calls in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

fn transient(message: &str) -> Error {
    Error::Transient(message.to_string())
}

#[async_trait]
impl Session for MockSession {
    async fn list_channels(&self, guild_id: u64) -> Result<Vec<Channel>> {
        let mut inner = self.lock();
        inner.calls.push(Call::ListChannels { guild_id });
        match &inner.channels_error {
            Some(message) => Err(transient(message)),
            None => Ok(inner.channels.clone()),
        }
    }

    async fn list_messages(
        &self,
        channel_id: u64,
        limit: u8,
        before: Option<u64>,
    ) -> Result<Vec<Message>> {
        let mut inner = self.lock();
        inner.calls.push(Call::ListMessages {
            channel_id,
            limit,
            before,
        });
        match inner.message_pages.pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(transient(&message)),
            None => Ok(Vec::new()),
        }
    }

    async fn list_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        limit: u8,
        after: Option<u64>,
    ) -> Result<Vec<u64>> {
        let mut inner = self.lock();
        inner.calls.push(Call::ListReactors {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
            limit,
            after,
        });

        let key = (message_id, emoji.to_string());
        let served = inner.reactor_calls.entry(key.clone()).or_insert(0);
        *served += 1;
        let served = *served;
        if inner
            .reactor_failures
            .get(&key)
            .is_some_and(|&ok_pages| served > ok_pages)
        {
            return Err(transient("reactor page unavailable"));
        }

        let users = inner.reactors.get(&key).cloned().unwrap_or_default();
        let start = match after {
            Some(after) => users
                .iter()
                .position(|&id| id == after)
                .map_or(users.len(), |pos| pos + 1),
            None => 0,
        };
        Ok(users
            .into_iter()
            .skip(start)
            .take(usize::from(limit))
            .collect())
    }

    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::RemoveReaction {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
            user_id,
        });
        if inner.fail_remove {
            return Err(Error::Permanent {
                status: 403,
                message: "Missing Permissions".to_string(),
            });
        }
        Ok(())
    }

    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::AddReaction {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        if inner.fail_add {
            return Err(transient("add reaction failed"));
        }
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::DeleteMessage {
            channel_id,
            message_id,
        });
        if inner.fail_delete {
            return Err(transient("delete failed"));
        }
        Ok(())
    }
}
