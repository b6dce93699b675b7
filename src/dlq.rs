use crate::domain::{DeadLetterQueue, Error};

/// Rejected commands land here; the run keeps going.
#[derive(Default, Debug)]
pub struct StdErrDLQ {}

impl DeadLetterQueue for StdErrDLQ {
    fn report(&self, error: &Error) {
        eprintln!("rejected: {}", error);
    }
}
