use futures::Stream;

use crate::domain::{Account, Command, Deal, Error, Money, UserId};

pub trait CommandStream {
    type Commands: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::Commands;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Event pushed to a counterparty after a committed transition. Delivery is
/// best effort; a failed send never rolls the transition back.
#[derive(Debug, Clone)]
pub enum Notification {
    DealAccepted { deal: Deal },
    DealCompleted { deal: Deal },
    BalanceCredited { amount: Money, new_balance: Money },
}

pub trait Notifier {
    fn notify(&self, recipient: UserId, note: &Notification) -> Result<(), Error>;
}

/// Storage seam for the escrow engine. The engine serializes access, so
/// every method observes committed state only; a relational backend would
/// satisfy the same contract with row-level transactions instead.
pub trait EscrowStore {
    fn get_or_create_account(&mut self, user_id: UserId) -> &mut Account;
    fn account(&self, user_id: UserId) -> Option<&Account>;

    fn insert_deal(&mut self, deal: Deal);
    fn contains_deal(&self, deal_id: &str) -> bool;
    fn deal(&self, deal_id: &str) -> Option<&Deal>;
    fn deal_mut(&mut self, deal_id: &str) -> Option<&mut Deal>;

    /// Deals where the user is buyer or seller, most recent first.
    fn deals_for(&self, user_id: UserId, limit: usize) -> Vec<Deal>;

    fn flush(&mut self);
}
