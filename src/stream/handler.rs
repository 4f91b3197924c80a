//! Stream handler - the per-session receive loop.
//!
//! One generic loop serves both protocol generations. It pulls entries from an
//! [`EntrySource`] one at a time, renders each through an [`EntryCodec`], and
//! hands the text to an [`EntrySink`]. The loop ends on a clean end-of-stream
//! (success) or on the first receive error (returned unchanged).

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use super::codec::EntryCodec;
use super::sink::EntrySink;
use crate::types::{Error, ProtocolVersion, Result};

/// Outcome of waiting for the next frame on a stream.
#[derive(Debug)]
pub enum Received<T> {
    /// A decoded entry.
    Entry(T),
    /// The peer closed its side of the stream.
    EndOfStream,
    /// The transport failed to deliver the next frame.
    Error(tonic::Status),
}

/// Anything that can yield log entries one at a time.
#[async_trait]
pub trait EntrySource: Send {
    type Entry: Send;

    async fn receive_next(&mut self) -> Received<Self::Entry>;
}

// Covers `tonic::Streaming<T>` as well as in-memory streams used in tests.
#[async_trait]
impl<S, T> EntrySource for S
where
    S: Stream<Item = std::result::Result<T, tonic::Status>> + Unpin + Send,
    T: Send,
{
    type Entry = T;

    async fn receive_next(&mut self) -> Received<T> {
        match self.next().await {
            Some(Ok(entry)) => Received::Entry(entry),
            Some(Err(status)) => Received::Error(status),
            None => Received::EndOfStream,
        }
    }
}

/// Lifecycle of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Receiving,
    ClosedClean,
    ClosedError,
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        matches!(self, SessionState::ClosedClean | SessionState::ClosedError)
    }
}

/// Counters and identity of a single session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub version: ProtocolVersion,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    /// Entries delivered by the transport.
    pub received: u64,
    /// Entries written to the sink.
    pub emitted: u64,
    /// Entries that failed to render or to write.
    pub dropped: u64,
}

impl SessionSummary {
    fn open(version: ProtocolVersion) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            version,
            state: SessionState::Open,
            started_at: Utc::now(),
            received: 0,
            emitted: 0,
            dropped: 0,
        }
    }
}

/// Receive loop bound to one protocol version, codec and sink.
#[derive(Clone)]
pub struct StreamHandler<C> {
    version: ProtocolVersion,
    codec: C,
    sink: Arc<dyn EntrySink>,
}

impl<C: fmt::Debug> fmt::Debug for StreamHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandler")
            .field("version", &self.version)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl<C> StreamHandler<C> {
    pub fn new(version: ProtocolVersion, codec: C, sink: Arc<dyn EntrySink>) -> Self {
        Self {
            version,
            codec,
            sink,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Drive one session to completion.
    ///
    /// Returns the session summary on a clean close, or
    /// [`Error::StreamReceive`] with the transport's status on a read error.
    /// Entries that fail to render are dropped and do not end the session.
    pub async fn run<S>(&self, mut source: S) -> Result<SessionSummary>
    where
        S: EntrySource,
        C: EntryCodec<S::Entry>,
    {
        let mut session = SessionSummary::open(self.version);
        let started = Instant::now();
        tracing::info!(session_id = %session.session_id, version = %self.version, "Started stream");
        session.state = SessionState::Receiving;

        loop {
            match source.receive_next().await {
                Received::Entry(entry) => {
                    session.received += 1;
                    tracing::info!(session_id = %session.session_id, seq = session.received, "Received value");
                    self.process(&mut session, &entry);
                }
                Received::EndOfStream => {
                    session.state = SessionState::ClosedClean;
                    tracing::info!(
                        session_id = %session.session_id,
                        received = session.received,
                        emitted = session.emitted,
                        dropped = session.dropped,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Stream closed"
                    );
                    return Ok(session);
                }
                Received::Error(status) => {
                    session.state = SessionState::ClosedError;
                    tracing::warn!(
                        session_id = %session.session_id,
                        received = session.received,
                        code = ?status.code(),
                        "Stream failed: {}",
                        status.message()
                    );
                    return Err(Error::stream_receive(status));
                }
            }
        }
    }

    /// Render and emit one entry. Failures here only cost this entry.
    fn process<T>(&self, session: &mut SessionSummary, entry: &T)
    where
        C: EntryCodec<T>,
    {
        let line = match self.codec.marshal(entry) {
            Ok(line) => line,
            Err(e) => {
                session.dropped += 1;
                tracing::warn!(session_id = %session.session_id, seq = session.received, "Dropping entry: {}", e);
                return;
            }
        };

        match self.sink.emit(&line) {
            Ok(()) => session.emitted += 1,
            Err(e) => {
                session.dropped += 1;
                tracing::warn!(session_id = %session.session_id, seq = session.received, "Failed to emit entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::codec::JsonCodec;
    use crate::stream::sink::{MemorySink, MockEntrySink};
    use pretty_assertions::assert_eq;
    use serde::ser::{Error as _, Serialize, Serializer};

    /// Test entry whose rendering can be forced to fail.
    #[derive(Debug, Clone)]
    struct Entry {
        id: u32,
        malformed: bool,
    }

    impl Entry {
        fn ok(id: u32) -> Self {
            Self { id, malformed: false }
        }

        fn malformed(id: u32) -> Self {
            Self { id, malformed: true }
        }
    }

    impl Serialize for Entry {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            if self.malformed {
                return Err(S::Error::custom(format!("entry {} violates schema", self.id)));
            }
            use serde::ser::SerializeStruct;
            let mut s = serializer.serialize_struct("Entry", 1)?;
            s.serialize_field("id", &self.id)?;
            s.end()
        }
    }

    fn handler(sink: &MemorySink) -> StreamHandler<JsonCodec> {
        StreamHandler::new(ProtocolVersion::V3, JsonCodec, Arc::new(sink.clone()))
    }

    fn source(
        items: Vec<std::result::Result<Entry, tonic::Status>>,
    ) -> impl EntrySource<Entry = Entry> {
        futures::stream::iter(items)
    }

    #[tokio::test]
    async fn two_entries_then_close() {
        let sink = MemorySink::new();
        let summary = handler(&sink)
            .run(source(vec![Ok(Entry::ok(1)), Ok(Entry::ok(2))]))
            .await
            .unwrap();

        assert_eq!(sink.lines(), vec![r#"{"id":1}"#, r#"{"id":2}"#]);
        assert_eq!(summary.state, SessionState::ClosedClean);
        assert_eq!(summary.received, 2);
        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.version, ProtocolVersion::V3);
    }

    #[tokio::test]
    async fn empty_stream_closes_cleanly() {
        let sink = MemorySink::new();
        let summary = handler(&sink).run(source(vec![])).await.unwrap();

        assert!(sink.is_empty());
        assert_eq!(summary.state, SessionState::ClosedClean);
        assert_eq!(summary.received, 0);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn malformed_entry_is_dropped_and_reported() {
        let sink = MemorySink::new();
        let summary = handler(&sink)
            .run(source(vec![
                Ok(Entry::ok(1)),
                Ok(Entry::malformed(2)),
                Ok(Entry::ok(3)),
            ]))
            .await
            .unwrap();

        assert_eq!(sink.lines(), vec![r#"{"id":1}"#, r#"{"id":3}"#]);
        assert_eq!(summary.received, 3);
        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.dropped, 1);
        assert!(logs_contain("Dropping entry"));
        assert!(logs_contain("entry 2 violates schema"));
    }

    #[tokio::test]
    async fn receive_error_stops_the_loop() {
        let sink = MemorySink::new();
        let err = handler(&sink)
            .run(source(vec![
                Ok(Entry::ok(1)),
                Err(tonic::Status::unavailable("connection reset")),
                Ok(Entry::ok(2)),
            ]))
            .await
            .unwrap_err();

        assert_eq!(sink.lines(), vec![r#"{"id":1}"#]);
        match err {
            Error::StreamReceive(status) => {
                assert_eq!(status.code(), tonic::Code::Unavailable);
                assert_eq!(status.message(), "connection reset");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn sink_failure_is_not_fatal() {
        let mut sink = MockEntrySink::new();
        let mut seq = mockall::Sequence::new();
        sink.expect_emit()
            .withf(|line| line.to_string() == r#"{"id":1}"#)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe)));
        sink.expect_emit()
            .withf(|line| line.to_string() == r#"{"id":2}"#)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let handler = StreamHandler::new(ProtocolVersion::V2, JsonCodec, Arc::new(sink));
        let summary = handler
            .run(source(vec![Ok(Entry::ok(1)), Ok(Entry::ok(2))]))
            .await
            .unwrap();

        assert_eq!(summary.emitted, 1);
        assert_eq!(summary.dropped, 1);
    }

    #[tokio::test]
    async fn sessions_get_distinct_ids() {
        let sink = MemorySink::new();
        let h = handler(&sink);
        let a = h.run(source(vec![])).await.unwrap();
        let b = h.run(source(vec![])).await.unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn closed_states() {
        assert!(!SessionState::Open.is_closed());
        assert!(!SessionState::Receiving.is_closed());
        assert!(SessionState::ClosedClean.is_closed());
        assert!(SessionState::ClosedError.is_closed());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_entry_emitted_in_order(ids in proptest::collection::vec(any::<u32>(), 0..64)) {
                let sink = MemorySink::new();
                let items = ids.iter().map(|id| Ok(Entry::ok(*id))).collect();
                let summary = tokio_test::block_on(handler(&sink).run(source(items))).unwrap();

                let expected: Vec<String> = ids.iter().map(|id| format!(r#"{{"id":{id}}}"#)).collect();
                prop_assert_eq!(sink.lines(), expected);
                prop_assert_eq!(summary.emitted, ids.len() as u64);
            }

            #[test]
            fn malformed_entry_only_removes_itself(
                ids in proptest::collection::vec(any::<u32>(), 1..32),
                pick in any::<prop::sample::Index>(),
            ) {
                let bad = pick.index(ids.len());
                let sink = MemorySink::new();
                let items = ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| Ok(if i == bad { Entry::malformed(*id) } else { Entry::ok(*id) }))
                    .collect();
                let summary = tokio_test::block_on(handler(&sink).run(source(items))).unwrap();

                let expected: Vec<String> = ids
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != bad)
                    .map(|(_, id)| format!(r#"{{"id":{id}}}"#))
                    .collect();
                prop_assert_eq!(sink.lines(), expected);
                prop_assert_eq!(summary.dropped, 1);
            }

            #[test]
            fn nothing_emitted_after_receive_error(
                ids in proptest::collection::vec(any::<u32>(), 0..32),
                tail in proptest::collection::vec(any::<u32>(), 0..8),
            ) {
                let sink = MemorySink::new();
                let items: Vec<_> = ids
                    .iter()
                    .map(|id| Ok(Entry::ok(*id)))
                    .chain(std::iter::once(Err(tonic::Status::internal("protocol violation"))))
                    .chain(tail.iter().map(|id| Ok(Entry::ok(*id))))
                    .collect();
                let result = tokio_test::block_on(handler(&sink).run(source(items)));

                prop_assert!(matches!(result, Err(Error::StreamReceive(_))));
                prop_assert_eq!(sink.len(), ids.len());
            }
        }
    }
}
