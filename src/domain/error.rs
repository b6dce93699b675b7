use crate::domain::Money;
use crate::domain::account::UserId;
use crate::domain::deal::{DealId, DealStatus};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("ingestion failed with: {0}")]
    Ingestion(String),

    #[error("notification failed with: {0}")]
    Notify(String),

    #[error("insufficient funds for user {user_id}: available {available}, required {required}")]
    InsufficientFunds {
        user_id: UserId,
        available: Money,
        required: Money,
    },

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Money),

    #[error("deal {0} not found")]
    NotFound(DealId),

    #[error("deal {deal_id} is {status}")]
    InvalidState { deal_id: DealId, status: DealStatus },

    #[error("operation forbidden for user {0}")]
    Forbidden(UserId),

    #[error("deal {0} cannot be accepted by its own buyer")]
    SelfDealNotAllowed(DealId),
}
