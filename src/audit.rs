//! Audit hooks for impersonation.
//!
//! An [`AuditSink`] hears about every start and stop. Persisting the events
//! is up to the sink; [`TracingAuditSink`] writes them to the log.

use crate::identity::UserId;

/// Receives impersonation events.
pub trait AuditSink: Send + Sync {
    /// Impersonation of `user_id` was committed to the session.
    fn on_impersonation_started(&self, user_id: &UserId);

    /// Impersonation is about to be cleared from the session.
    fn on_impersonation_stopped(&self);
}

/// Audit sink that emits `tracing` events under `impersonation.audit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn on_impersonation_started(&self, user_id: &UserId) {
        tracing::info!(
            target: "impersonation.audit",
            event = "started",
            user_id = %user_id,
            "Impersonation started"
        );
    }

    fn on_impersonation_stopped(&self) {
        tracing::info!(
            target: "impersonation.audit",
            event = "stopped",
            "Impersonation stopped"
        );
    }
}

/// Recording sink for testing.
#[cfg(any(test, feature = "test-helpers"))]
pub mod test {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Event captured by [`RecordingAuditSink`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum AuditEvent {
        Started(UserId),
        Stopped,
    }

    /// Audit sink that keeps every event in memory.
    #[derive(Debug, Default)]
    pub struct RecordingAuditSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl RecordingAuditSink {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
            self.events.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// All events so far, oldest first.
        pub fn events(&self) -> Vec<AuditEvent> {
            self.lock().clone()
        }
    }

    impl AuditSink for RecordingAuditSink {
        fn on_impersonation_started(&self, user_id: &UserId) {
            self.lock().push(AuditEvent::Started(user_id.clone()));
        }

        fn on_impersonation_stopped(&self) {
            self.lock().push(AuditEvent::Stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test::{AuditEvent, RecordingAuditSink};
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingAuditSink::new();
        sink.on_impersonation_started(&UserId::from(1));
        sink.on_impersonation_stopped();
        sink.on_impersonation_started(&UserId::from("abc"));

        assert_eq!(
            sink.events(),
            vec![
                AuditEvent::Started(UserId::from(1)),
                AuditEvent::Stopped,
                AuditEvent::Started(UserId::from("abc")),
            ]
        );
    }

    #[test]
    fn test_tracing_sink_is_object_safe() {
        let sink: Box<dyn AuditSink> = Box::new(TracingAuditSink);
        sink.on_impersonation_started(&UserId::from(7));
        sink.on_impersonation_stopped();
    }
}
