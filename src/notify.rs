use crate::domain::{Error, Notification, Notifier, UserId};

/// Stand-in for a chat delivery channel; writes the event to the log.
#[derive(Default, Debug)]
pub struct LogNotifier {}

impl Notifier for LogNotifier {
    fn notify(&self, recipient: UserId, note: &Notification) -> Result<(), Error> {
        tracing::info!(recipient, ?note, "notify");
        Ok(())
    }
}
