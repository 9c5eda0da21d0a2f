//! Historical backfill: walk the channel history newest-first and
//! reconcile every message down to a fixed cutoff.

#[path = "backfill_tests.rs"]
mod backfill_tests;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::engine::{Engine, PAGE_SIZE};
use crate::error::log_failure;
use crate::session::Session;

/// Unix time of 2025-01-01T00:00:00Z. History older than this is left alone.
pub const HISTORICAL_CUTOFF: i64 = 1_735_689_600;

/// Pause between history pages.
const PAGE_DELAY: Duration = Duration::from_millis(500);

/// A progress line is logged at page boundaries where the processed count
/// is a multiple of this.
const PROGRESS_INTERVAL: usize = 500;

pub fn historical_cutoff() -> DateTime<Utc> {
    DateTime::from_timestamp(HISTORICAL_CUTOFF, 0).unwrap_or_default()
}

/// Why the backfill stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillOutcome {
    /// Hit a message older than the cutoff.
    CutoffReached,
    /// The platform returned an empty page.
    Exhausted,
    /// The cancellation token fired.
    Cancelled,
    /// A history page could not be fetched.
    FetchError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub outcome: BackfillOutcome,
    pub processed: usize,
    pub replaced: usize,
}

impl<S: Session, C: Clock> Engine<S, C> {
    /// Reconcile channel history until the cutoff, the end of history, a
    /// fetch failure, or cancellation.
    ///
    /// Cancellation is checked before each page fetch only; a page that
    /// has started is always finished.
    pub async fn run_backfill(&self, cancel: &CancellationToken) -> BackfillReport {
        let mut processed = 0;
        let mut replaced = 0;
        let report = |outcome, processed, replaced| BackfillReport {
            outcome,
            processed,
            replaced,
        };

        let Some(channel_id) = self.state.channel_id() else {
            warn!("historical processing requested before channel resolution");
            return report(BackfillOutcome::FetchError, processed, replaced);
        };

        info!(
            cutoff = %self.cutoff.format("%Y-%m-%d"),
            "processing historical messages"
        );

        let mut before = None;
        let outcome = loop {
            if cancel.is_cancelled() {
                info!(processed, replaced, "historical processing cancelled");
                break BackfillOutcome::Cancelled;
            }

            let messages = match self
                .session
                .list_messages(channel_id, PAGE_SIZE, before)
                .await
            {
                Ok(messages) => messages,
                Err(e) => {
                    log_failure!(e, processed, replaced, "failed to fetch messages");
                    break BackfillOutcome::FetchError;
                }
            };

            let Some(last) = messages.last() else {
                break BackfillOutcome::Exhausted;
            };

            for message in &messages {
                if message.timestamp < self.cutoff {
                    info!(processed, replaced, "reached messages before cutoff");
                    return report(BackfillOutcome::CutoffReached, processed, replaced);
                }

                replaced += self.process_message_reactions(message).await;
                processed += 1;
            }

            before = Some(last.id);

            if processed % PROGRESS_INTERVAL == 0 {
                info!(processed, replaced, "historical processing progress");
            }

            self.clock.sleep(PAGE_DELAY).await;
        };

        if outcome == BackfillOutcome::Exhausted {
            info!(processed, replaced, "historical processing complete");
        }
        report(outcome, processed, replaced)
    }
}
