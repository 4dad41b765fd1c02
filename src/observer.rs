//! User-facing progress reporting.
//!
//! The session reports noteworthy outcomes (authentication results, model
//! loads, connection teardown) through an injected [`Observer`] instead of
//! writing to the console directly, so embedding applications can route them
//! to their own UI. The default [`TracingObserver`] forwards everything to
//! [`tracing`].

use std::fmt;

/// Receives human-readable progress messages from a
/// [`Session`](crate::session::Session).
///
/// Implementations must be cheap; they are called while the session mutex is
/// held.
pub trait Observer: Send + Sync {
    /// An informational message, e.g. a successful authentication.
    fn info(&self, message: &str);

    /// A warning, e.g. a denied authentication or a failed close.
    fn warn(&self, message: &str);
}

/// The default [`Observer`], forwarding to [`tracing::info!`] and
/// [`tracing::warn!`].
#[derive(Default, Debug, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// An [`Observer`] that discards all messages.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}

impl fmt::Debug for dyn Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Observer")
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::Observer;
    use std::sync::{Arc, Mutex};

    /// Captures messages for assertions in session tests.
    #[derive(Default, Debug, Clone)]
    pub(crate) struct RecordingObserver {
        messages: Arc<Mutex<Vec<(&'static str, String)>>>,
    }

    impl RecordingObserver {
        pub fn messages(&self) -> Vec<(&'static str, String)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Observer for RecordingObserver {
        fn info(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(("info", message.to_owned()));
        }

        fn warn(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(("warn", message.to_owned()));
        }
    }
}
