//! Side channels the session store drives: user-visible notifications and page navigation.

use tracing::{info, warn};

/// Toast sink. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Page navigation, e.g. back to the sign-in page after sign-out.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Emits notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(notification = "error", "{message}");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}
