use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::domain::Money;
use crate::domain::account::UserId;

pub type DealId = String;

/// Deal identifiers double as bearer capabilities: anyone holding one may
/// attempt acceptance. 48 random bits keep guessing impractical.
pub fn generate_deal_id() -> DealId {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealStatus {
    Created,
    InProgress,
    Completed,
    Cancelled,
}

impl DealStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealStatus::Completed | DealStatus::Cancelled)
    }
}

impl core::fmt::Display for DealStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            DealStatus::Created => "created",
            DealStatus::InProgress => "in_progress",
            DealStatus::Completed => "completed",
            DealStatus::Cancelled => "cancelled",
        })
    }
}

/// Escrow record. The amount is debited from the buyer at creation and held
/// by the deal until settlement; deals are kept forever as an audit trail.
#[derive(Debug, Clone)]
pub struct Deal {
    pub deal_id: DealId,
    pub buyer_id: UserId,
    pub seller_id: Option<UserId>,
    pub amount: Money,
    pub description: String,
    pub status: DealStatus,
    pub created_at: DateTime<Utc>,
}

impl Deal {
    pub fn new(buyer_id: UserId, amount: Money, description: &str) -> Self {
        Self {
            deal_id: generate_deal_id(),
            buyer_id,
            seller_id: None,
            amount,
            description: description.to_owned(),
            status: DealStatus::Created,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DealStatus, generate_deal_id};

    #[test]
    fn generated_ids_are_twelve_uppercase_hex_chars() {
        let id = generate_deal_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn terminal_states() {
        assert!(!DealStatus::Created.is_terminal());
        assert!(!DealStatus::InProgress.is_terminal());
        assert!(DealStatus::Completed.is_terminal());
        assert!(DealStatus::Cancelled.is_terminal());
    }
}
