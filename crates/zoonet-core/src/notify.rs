//! User-feedback capability, injected instead of looked up via globals.

/// Receives success/error notices from operations that want to surface
/// outcomes to a user (CLI output, UI toast, etc.). Passed explicitly into
/// whichever component needs it.
pub trait Notifier: Send + Sync {
    fn on_success(&self, message: &str);
    fn on_error(&self, message: &str);
}

/// Notifier that forwards to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn on_success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn on_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
