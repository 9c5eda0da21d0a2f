#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::time::Duration;

    use chrono::{DateTime, TimeZone, Utc};
    use tokio_util::sync::CancellationToken;

    use crate::backfill::{historical_cutoff, BackfillOutcome, BackfillReport};
    use crate::clock::{Clock, MockClock};
    use crate::engine::{Engine, Settings};
    use crate::membership::Membership;
    use crate::mock::{Call, MockSession};
    use crate::types::{Channel, ChannelKind, EmojiDescriptor, Message, ReactionSummary};

    const CHANNEL: u64 = 10;
    const TARGET: u64 = 100;

    fn settings() -> Settings {
        Settings {
            guild_id: 1,
            channel_name: "jollyposting".to_string(),
            targets: Membership::new([TARGET]),
            substitute_emoji: "jollyskull:777".to_string(),
        }
    }

    fn session() -> MockSession {
        MockSession::new().with_channels(vec![Channel {
            id: CHANNEL,
            name: "jollyposting".to_string(),
            kind: ChannelKind::Text,
        }])
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn message(id: u64, timestamp: DateTime<Utc>) -> Message {
        Message {
            id,
            channel_id: CHANNEL,
            author_id: Some(42),
            content: "post".to_string(),
            timestamp,
            reactions: vec![],
        }
    }

    fn skulled(id: u64, timestamp: DateTime<Utc>) -> Message {
        Message {
            reactions: vec![ReactionSummary {
                emoji: EmojiDescriptor::unicode("💀"),
                count: 1,
            }],
            ..message(id, timestamp)
        }
    }

    async fn ready_engine(session: MockSession, clock: MockClock) -> Engine<MockSession, MockClock> {
        let engine = Engine::new(settings(), session)
            .with_clock(clock)
            .with_cutoff(date(2025, 1, 1));
        engine.initialize().await.unwrap();
        engine
    }

    fn message_fetches(session: &MockSession) -> Vec<Option<u64>> {
        session
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ListMessages { before, .. } => Some(before),
                _ => None,
            })
            .collect()
    }

    /// Cancels the token the first time the backfill paces itself.
    struct CancelOnSleep(CancellationToken);

    impl Clock for CancelOnSleep {
        fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
            self.0.cancel();
            std::future::ready(())
        }
    }

    #[test]
    fn test_historical_cutoff_is_2025() {
        assert_eq!(historical_cutoff(), date(2025, 1, 1));
        assert_eq!(
            historical_cutoff(),
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap()
        );
    }

    #[tokio::test]
    async fn test_stops_at_cutoff() {
        let session = session().push_message_page(vec![
            message(2, date(2025, 6, 1)),
            message(1, date(2024, 12, 1)),
        ]);
        let engine = ready_engine(session.clone(), MockClock::new()).await;

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(
            report,
            BackfillReport {
                outcome: BackfillOutcome::CutoffReached,
                processed: 1,
                replaced: 0,
            }
        );
        assert_eq!(message_fetches(&session), vec![None]);
    }

    #[tokio::test]
    async fn test_message_at_cutoff_is_processed() {
        let session = session().push_message_page(vec![message(1, date(2025, 1, 1))]);
        let engine = ready_engine(session, MockClock::new()).await;

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(report.outcome, BackfillOutcome::Exhausted);
        assert_eq!(report.processed, 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let session = session();
        let engine = ready_engine(session.clone(), MockClock::new()).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = engine.run_backfill(&cancel).await;

        assert_eq!(report.outcome, BackfillOutcome::Cancelled);
        assert_eq!(report.processed, 0);
        assert!(message_fetches(&session).is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_waits_for_page_boundary() {
        let session = session()
            .push_message_page(vec![message(3, date(2025, 6, 3)), message(2, date(2025, 6, 2))])
            .push_message_page(vec![message(1, date(2025, 6, 1))]);
        let cancel = CancellationToken::new();
        let engine = Engine::new(settings(), session.clone())
            .with_clock(CancelOnSleep(cancel.clone()))
            .with_cutoff(date(2025, 1, 1));
        engine.initialize().await.unwrap();

        let report = engine.run_backfill(&cancel).await;

        assert_eq!(report.outcome, BackfillOutcome::Cancelled);
        assert_eq!(report.processed, 2);
        assert_eq!(message_fetches(&session), vec![None]);
    }

    #[tokio::test]
    async fn test_exhausts_history_and_paces() {
        let clock = MockClock::new();
        let session = session()
            .push_message_page(vec![message(5, date(2025, 6, 5)), message(4, date(2025, 6, 4))])
            .push_message_page(vec![message(3, date(2025, 6, 3))]);
        let engine = ready_engine(session.clone(), clock.clone()).await;

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(report.outcome, BackfillOutcome::Exhausted);
        assert_eq!(report.processed, 3);
        assert_eq!(message_fetches(&session), vec![None, Some(4), Some(3)]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(500); 2]);
        assert!(session.calls().iter().any(|c| matches!(
            c,
            Call::ListMessages {
                channel_id: CHANNEL,
                limit: 100,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_counts() {
        let session = session()
            .push_message_page(vec![skulled(2, date(2025, 6, 2))])
            .push_message_error("boom")
            .with_reactors(2, "💀", vec![TARGET]);
        let engine = ready_engine(session.clone(), MockClock::new()).await;

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(
            report,
            BackfillReport {
                outcome: BackfillOutcome::FetchError,
                processed: 1,
                replaced: 1,
            }
        );
        assert_eq!(message_fetches(&session), vec![None, Some(2)]);
    }

    #[tokio::test]
    async fn test_replacements_are_summed() {
        let session = session()
            .push_message_page(vec![
                skulled(3, date(2025, 6, 3)),
                message(2, date(2025, 6, 2)),
                skulled(1, date(2025, 6, 1)),
            ])
            .with_reactors(3, "💀", vec![TARGET, 555])
            .with_reactors(1, "💀", vec![TARGET]);
        let engine = ready_engine(session.clone(), MockClock::new()).await;

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(report.processed, 3);
        assert_eq!(report.replaced, 2);
        assert_eq!(
            session.count(|c| matches!(c, Call::AddReaction { emoji, .. } if emoji == "jollyskull:777")),
            2
        );
    }

    #[tokio::test]
    async fn test_not_ready_does_not_fetch() {
        let session = session();
        let engine = Engine::new(settings(), session.clone()).with_clock(MockClock::new());

        let report = engine.run_backfill(&CancellationToken::new()).await;

        assert_eq!(report.outcome, BackfillOutcome::FetchError);
        assert!(session.calls().is_empty());
    }
}
