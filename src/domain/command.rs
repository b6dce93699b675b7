use crate::domain::Money;
use crate::domain::account::UserId;

/// One external interaction, as replayed by the scripted driver.
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// Administrative top-up; the secret is validated by the engine.
    Credit { amount: Money, secret: String },
    /// Opens a deal. The optional label lets later rows in the same run
    /// reference the generated deal id.
    Open {
        amount: Money,
        description: String,
        label: Option<String>,
    },
    /// `deal` is a label or a raw deal id.
    Accept { deal: String },
    Cancel { deal: String },
    Complete { deal: String },
}

#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub actor: UserId,
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            CommandKind::Credit { amount, .. } => {
                write!(f, "credit,actor={},amount={}", self.actor, amount)
            }
            CommandKind::Open {
                amount,
                description,
                ..
            } => write!(
                f,
                "open,actor={},amount={},description={}",
                self.actor, amount, description
            ),
            CommandKind::Accept { deal } => write!(f, "accept,actor={},deal={}", self.actor, deal),
            CommandKind::Cancel { deal } => write!(f, "cancel,actor={},deal={}", self.actor, deal),
            CommandKind::Complete { deal } => {
                write!(f, "complete,actor={},deal={}", self.actor, deal)
            }
        }
    }
}
