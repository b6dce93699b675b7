pub mod account;
pub mod command;
pub mod deal;
pub mod error;
pub mod money;
pub mod traits;

pub use account::{Account, UserId};
pub use command::{Command, CommandKind};
pub use deal::{Deal, DealId, DealStatus};
pub use error::Error;
pub use money::Money;
pub use traits::{CommandStream, DeadLetterQueue, EscrowStore, Notification, Notifier};
