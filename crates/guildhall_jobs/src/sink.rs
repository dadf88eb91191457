//! # Event Sinks
//!
//! Where level-up, grade-up and job-selected notifications go. Emitting never
//! blocks the caller: the buffered sink appends under a short lock, the
//! channel sink uses `try_send` and drops (with a warning) when full.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use guildhall_shared::JobEvent;
use parking_lot::Mutex;

/// Receives engine notifications.
pub trait EventSink: Send + Sync {
    /// Hands over one event. Must not block.
    fn emit(&self, event: JobEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: JobEvent) {}
}

/// Buffers events until the host drains them (once per tick, typically).
#[derive(Debug, Default)]
pub struct BufferedSink {
    events: Mutex<Vec<JobEvent>>,
}

impl BufferedSink {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(256)),
        }
    }

    /// Takes every pending event.
    pub fn drain(&self) -> Vec<JobEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Peeks at the pending event count.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl EventSink for BufferedSink {
    fn emit(&self, event: JobEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards events over a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<JobEvent>,
}

impl ChannelSink {
    /// Bounded channel; events are dropped when the consumer falls behind.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<JobEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Unbounded channel.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<JobEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: JobEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    player = event.player(),
                    kind = ?event.kind(),
                    "event channel full, dropping notification"
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("event channel disconnected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildhall_shared::{EventKind, JobClass};

    fn selected(player: u64) -> JobEvent {
        JobEvent::JobSelected {
            player,
            job: JobClass::Miner,
        }
    }

    #[test]
    fn test_buffered_drain_empties() {
        let sink = BufferedSink::new();
        sink.emit(selected(1));
        sink.emit(selected(2));
        assert_eq!(sink.pending_count(), 2);

        let events = sink.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(sink.pending_count(), 0);
    }

    #[test]
    fn test_bounded_channel_drops_when_full() {
        let (sink, rx) = ChannelSink::bounded(1);
        sink.emit(selected(1));
        sink.emit(selected(2));

        let received: Vec<JobEvent> = rx.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].player(), 1);
        assert_eq!(received[0].kind(), EventKind::JobSelected);
    }

    #[test]
    fn test_disconnected_channel_does_not_panic() {
        let (sink, rx) = ChannelSink::unbounded();
        drop(rx);
        sink.emit(selected(1));
    }
}
