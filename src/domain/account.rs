use crate::domain::{Error, Money};

pub type UserId = u64;

/// Balance ledger entry for a single user. Accounts are created on first
/// touch with a zero balance and never deleted.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub balance: Money,
}

impl Account {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: Money::ZERO,
        }
    }

    /// Applies a signed delta and returns the new balance. The overdraft
    /// check and the write share one borrow; a caller holding the store lock
    /// therefore cannot lose an update to a concurrent adjustment.
    pub fn adjust(&mut self, delta: Money) -> Result<Money, Error> {
        let next = self.balance + delta;
        if next < Money::ZERO {
            return Err(Error::InsufficientFunds {
                user_id: self.user_id,
                available: self.balance,
                required: -delta,
            });
        }
        self.balance = next;
        Ok(self.balance)
    }

    pub fn credit(&mut self, amount: Money) -> Money {
        self.balance += amount;
        self.balance
    }

    pub fn debit(&mut self, amount: Money) -> Result<Money, Error> {
        self.adjust(-amount)
    }
}

#[cfg(test)]
mod tests {
    use super::Account;
    use crate::domain::{Error, Money};

    #[test]
    fn debit_beyond_balance_is_rejected() {
        let mut account = Account::new(7);
        account.credit(Money::from(50));
        let err = account.debit(Money::from(80)).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { user_id: 7, .. }));
        assert_eq!(account.balance, Money::from(50));
    }

    #[test]
    fn adjust_returns_new_balance() {
        let mut account = Account::new(1);
        assert_eq!(account.adjust(Money::from(30)).unwrap(), Money::from(30));
        assert_eq!(account.adjust(-Money::from(10)).unwrap(), Money::from(20));
    }
}
