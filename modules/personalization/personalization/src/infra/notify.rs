use personalization_sdk::PreferencesError;

use crate::domain::ports::ErrorNotifier;

/// Notifier for hosts without a toast surface: emits a `warn` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ErrorNotifier for LogNotifier {
    fn save_failed(&self, error: &PreferencesError) {
        tracing::warn!(error = %error, "Could not save your preferences. We'll retry on your next change.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_log_notifier_emits_warning() {
        LogNotifier.save_failed(&PreferencesError::unavailable("connection refused"));
        assert!(logs_contain("Could not save your preferences"));
        assert!(logs_contain("connection refused"));
    }
}
