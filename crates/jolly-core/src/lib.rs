//! Skull reaction replacement engine
//!
//! Watches one channel for skull-class reactions (and skull-only messages)
//! from a fixed set of users and swaps them for the jollyskull. The platform
//! is reached through the [`Session`] trait so the engine can be driven by
//! serenity in production and by [`mock::MockSession`] in tests.

pub mod backfill;
pub mod clock;
pub mod emoji;
pub mod engine;
pub mod error;
pub mod membership;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod session;
pub mod state;
pub mod types;

pub use backfill::{historical_cutoff, BackfillOutcome, BackfillReport, HISTORICAL_CUTOFF};
pub use clock::{Clock, SystemClock};
pub use emoji::{is_skull_emoji, is_skull_only_content};
pub use engine::{find_channel_by_name, Engine, Settings, PAGE_SIZE};
pub use error::{Error, Result};
pub use membership::Membership;
pub use session::Session;
pub use state::RuntimeState;
pub use types::{Channel, ChannelKind, EmojiDescriptor, Message, ReactionEvent, ReactionSummary};
