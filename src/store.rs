use std::collections::HashMap;

use crate::domain::{Account, Deal, DealId, EscrowStore, UserId};

/// In-memory store backing the engine. The engine serializes access behind
/// its lock, so plain maps suffice here.
#[derive(Default, Debug)]
pub struct MemoryStore {
    accounts: HashMap<UserId, Account>,
    deals: HashMap<DealId, Deal>,
    // deal ids in creation order; backs most-recent-first listings
    journal: Vec<DealId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EscrowStore for MemoryStore {
    fn get_or_create_account(&mut self, user_id: UserId) -> &mut Account {
        self.accounts
            .entry(user_id)
            .or_insert_with(|| Account::new(user_id))
    }

    fn account(&self, user_id: UserId) -> Option<&Account> {
        self.accounts.get(&user_id)
    }

    fn insert_deal(&mut self, deal: Deal) {
        self.journal.push(deal.deal_id.clone());
        self.deals.insert(deal.deal_id.clone(), deal);
    }

    fn contains_deal(&self, deal_id: &str) -> bool {
        self.deals.contains_key(deal_id)
    }

    fn deal(&self, deal_id: &str) -> Option<&Deal> {
        self.deals.get(deal_id)
    }

    fn deal_mut(&mut self, deal_id: &str) -> Option<&mut Deal> {
        self.deals.get_mut(deal_id)
    }

    fn deals_for(&self, user_id: UserId, limit: usize) -> Vec<Deal> {
        self.journal
            .iter()
            .rev()
            .filter_map(|id| self.deals.get(id))
            .filter(|deal| deal.buyer_id == user_id || deal.seller_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect()
    }

    fn flush(&mut self) {
        println!("user,balance");
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.user_id);
        for account in accounts {
            println!("{},{}", account.user_id, account.balance);
        }

        println!("deal,buyer,seller,amount,status,description");
        for id in &self.journal {
            if let Some(deal) = self.deals.get(id) {
                println!(
                    "{},{},{},{},{},{}",
                    deal.deal_id,
                    deal.buyer_id,
                    deal.seller_id.map(|s| s.to_string()).unwrap_or_default(),
                    deal.amount,
                    deal.status,
                    deal.description
                );
            }
        }
    }
}
