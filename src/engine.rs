use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use futures::StreamExt;

use crate::domain::{
    Command, CommandKind, Deal, DealId, DealStatus, Error, Money, Notification, UserId, deal,
    traits::{CommandStream, DeadLetterQueue, EscrowStore, Notifier},
};

/// Escrow state machine over an injected store and notification channel.
///
/// Every mutating operation takes the store lock once and performs all of
/// its checks and writes inside that critical section, so each operation is
/// atomic with respect to the accounts and the deal it touches. Checks
/// always precede writes; a rejected operation returns before its first
/// write and leaves state unchanged. Notification sends happen after the
/// lock is released.
#[derive(Debug)]
pub struct EscrowEngine<S, N>
where
    S: EscrowStore,
    N: Notifier,
{
    store: Mutex<S>,
    notifier: N,
    admin_secret: Option<String>,
}

impl<S, N> EscrowEngine<S, N>
where
    S: EscrowStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, admin_secret: Option<String>) -> Self {
        Self {
            store: Mutex::new(store),
            notifier,
            admin_secret,
        }
    }

    fn store(&self) -> MutexGuard<'_, S> {
        // Nothing panics while holding the lock, so poisoning cannot leave
        // half-applied state behind.
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn send(&self, recipient: UserId, note: Notification) {
        if let Err(e) = self.notifier.notify(recipient, &note) {
            tracing::warn!(recipient, error = %e, "notification delivery failed");
        }
    }

    /// Returns 0 for an account never seen.
    pub fn get_balance(&self, user_id: UserId) -> Money {
        self.store()
            .account(user_id)
            .map(|a| a.balance)
            .unwrap_or(Money::ZERO)
    }

    /// Applies a signed delta to a balance, creating the account at zero if
    /// absent, and returns the new balance.
    pub fn adjust(&self, user_id: UserId, delta: Money) -> Result<Money, Error> {
        self.store().get_or_create_account(user_id).adjust(delta)
    }

    /// Out-of-band balance top-up, guarded by the configured credential.
    /// With no credential configured every attempt is rejected.
    pub fn admin_credit(
        &self,
        target_user_id: UserId,
        amount: Money,
        secret: &str,
    ) -> Result<Money, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }
        if self.admin_secret.as_deref() != Some(secret) {
            return Err(Error::Forbidden(target_user_id));
        }

        let new_balance = self.store().get_or_create_account(target_user_id).adjust(amount)?;

        tracing::info!(target_user_id, %amount, %new_balance, "administrative credit");
        self.send(
            target_user_id,
            Notification::BalanceCredited {
                amount,
                new_balance,
            },
        );
        Ok(new_balance)
    }

    /// Debits the buyer and inserts a fresh deal holding the amount.
    pub fn open_deal(
        &self,
        buyer_id: UserId,
        amount: Money,
        description: &str,
    ) -> Result<DealId, Error> {
        if !amount.is_positive() {
            return Err(Error::InvalidAmount(amount));
        }

        let mut store = self.store();
        store.get_or_create_account(buyer_id).debit(amount)?;

        let mut deal = Deal::new(buyer_id, amount, description);
        while store.contains_deal(&deal.deal_id) {
            deal.deal_id = deal::generate_deal_id();
        }
        let deal_id = deal.deal_id.clone();
        store.insert_deal(deal);
        drop(store);

        tracing::info!(%deal_id, buyer_id, %amount, "deal opened");
        Ok(deal_id)
    }

    /// Binds a seller to a `created` deal. The status check and the write
    /// share the critical section, so exactly one concurrent acceptor wins
    /// and every other caller observes the advanced state.
    pub fn accept_deal(&self, deal_id: &str, seller_id: UserId) -> Result<Deal, Error> {
        let mut store = self.store();
        let deal = store
            .deal_mut(deal_id)
            .ok_or_else(|| Error::NotFound(deal_id.to_owned()))?;

        if deal.buyer_id == seller_id {
            return Err(Error::SelfDealNotAllowed(deal_id.to_owned()));
        }
        if deal.status != DealStatus::Created {
            return Err(Error::InvalidState {
                deal_id: deal_id.to_owned(),
                status: deal.status,
            });
        }

        deal.seller_id = Some(seller_id);
        deal.status = DealStatus::InProgress;
        let deal = deal.clone();
        drop(store);

        tracing::info!(deal_id, seller_id, "deal accepted");
        self.send(deal.buyer_id, Notification::DealAccepted { deal: deal.clone() });
        Ok(deal)
    }

    /// Refunds the buyer and cancels a still-unaccepted deal. Only the
    /// buyer may cancel, and only while the deal is `created`.
    pub fn cancel_deal(&self, deal_id: &str, requester_id: UserId) -> Result<Deal, Error> {
        let mut store = self.store();
        let (buyer_id, amount) = {
            let deal = store
                .deal(deal_id)
                .ok_or_else(|| Error::NotFound(deal_id.to_owned()))?;
            if deal.buyer_id != requester_id {
                return Err(Error::Forbidden(requester_id));
            }
            if deal.status != DealStatus::Created {
                return Err(Error::InvalidState {
                    deal_id: deal_id.to_owned(),
                    status: deal.status,
                });
            }
            (deal.buyer_id, deal.amount)
        };

        store.get_or_create_account(buyer_id).credit(amount);
        let deal = store
            .deal_mut(deal_id)
            .ok_or_else(|| Error::NotFound(deal_id.to_owned()))?;
        deal.status = DealStatus::Cancelled;
        let deal = deal.clone();
        drop(store);

        tracing::info!(deal_id, buyer_id, %amount, "deal cancelled, buyer refunded");
        Ok(deal)
    }

    /// Pays the held amount out to the seller once the buyer confirms.
    pub fn complete_deal(&self, deal_id: &str, requester_id: UserId) -> Result<Deal, Error> {
        let mut store = self.store();
        let (seller_id, amount) = {
            let deal = store
                .deal(deal_id)
                .ok_or_else(|| Error::NotFound(deal_id.to_owned()))?;
            if deal.status != DealStatus::InProgress {
                return Err(Error::InvalidState {
                    deal_id: deal_id.to_owned(),
                    status: deal.status,
                });
            }
            if deal.buyer_id != requester_id {
                return Err(Error::Forbidden(requester_id));
            }
            // seller_id is always set on an in_progress deal
            let seller_id = deal.seller_id.ok_or_else(|| Error::InvalidState {
                deal_id: deal_id.to_owned(),
                status: deal.status,
            })?;
            (seller_id, deal.amount)
        };

        store.get_or_create_account(seller_id).credit(amount);
        let deal = store
            .deal_mut(deal_id)
            .ok_or_else(|| Error::NotFound(deal_id.to_owned()))?;
        deal.status = DealStatus::Completed;
        let deal = deal.clone();
        drop(store);

        tracing::info!(deal_id, seller_id, %amount, "deal completed, seller paid");
        self.send(seller_id, Notification::DealCompleted { deal: deal.clone() });
        Ok(deal)
    }

    /// Deals where the user is buyer or seller, most recent first.
    pub fn list_deals_for(&self, user_id: UserId, limit: usize) -> Vec<Deal> {
        self.store().deals_for(user_id, limit)
    }

    pub fn get_deal(&self, deal_id: &str) -> Result<Deal, Error> {
        self.store()
            .deal(deal_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(deal_id.to_owned()))
    }

    /// Drains a command stream, reporting rejected commands to the DLQ and
    /// carrying on. Labels assigned by `open` rows resolve to the generated
    /// deal ids for later rows.
    pub async fn process<C, D>(&self, ingestion: &mut C, dlq: &D) -> Result<(), Error>
    where
        C: CommandStream,
        D: DeadLetterQueue,
    {
        let mut commands = ingestion.stream();
        let mut labels: HashMap<String, DealId> = HashMap::new();

        while let Some(cmd) = commands.next().await {
            match cmd {
                Ok(cmd) => {
                    if let Err(e) = self.apply(cmd, &mut labels) {
                        dlq.report(&e);
                    }
                }
                Err(e) => dlq.report(&e),
            }
        }

        Ok(())
    }

    fn apply(&self, cmd: Command, labels: &mut HashMap<String, DealId>) -> Result<(), Error> {
        tracing::debug!(%cmd, "applying command");
        match cmd.kind {
            CommandKind::Credit { amount, secret } => {
                self.admin_credit(cmd.actor, amount, &secret)?;
            }
            CommandKind::Open {
                amount,
                description,
                label,
            } => {
                let deal_id = self.open_deal(cmd.actor, amount, &description)?;
                if let Some(label) = label {
                    labels.insert(label, deal_id);
                }
            }
            CommandKind::Accept { deal } => {
                self.accept_deal(&resolve(labels, deal), cmd.actor)?;
            }
            CommandKind::Cancel { deal } => {
                self.cancel_deal(&resolve(labels, deal), cmd.actor)?;
            }
            CommandKind::Complete { deal } => {
                self.complete_deal(&resolve(labels, deal), cmd.actor)?;
            }
        }
        Ok(())
    }

    pub fn flush(&self) {
        self.store().flush();
    }
}

fn resolve(labels: &HashMap<String, DealId>, deal: String) -> DealId {
    labels.get(&deal).cloned().unwrap_or(deal)
}
