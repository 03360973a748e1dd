//! Notification hand-off boundary.

/// One-shot notification sink, invoked exactly once per transition into
/// the matched state. Delivery and retry semantics belong to the sink.
pub trait NotificationSink {
    /// Deliver a match notification with a short text payload.
    fn notify(&mut self, message: &str);
}

/// Sink that only logs; the default when no delivery layer is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, message: &str) {
        tracing::info!(message, "match notification");
    }
}

impl<F: FnMut(&str)> NotificationSink for F {
    fn notify(&mut self, message: &str) {
        self(message);
    }
}
