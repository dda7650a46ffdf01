//! Notifier — the delivery capability invoked when a reminder fires.
//!
//! Delivery happens on the timer task, not the caller's context, so
//! implementations must not assume any particular thread or state. A failed
//! alert is logged by the engine and dropped; it never crashes the timer
//! and is never retried.

use bellhop_core::error::Result;

/// Delivers a fired reminder to the user. Implemented externally
/// (voice, text UI, chat channel); injected into the manager.
pub trait Notifier: Send + Sync {
    fn alert(&self, text: &str) -> Result<()>;
}

/// Prints reminders to stdout. The default for the CLI's foreground mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, text: &str) -> Result<()> {
        println!("🔔 Reminder: {text}");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records every alert for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub alerts: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, text: &str) -> Result<()> {
            self.alerts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
