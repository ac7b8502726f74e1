pub use account::{Account, Accounts};
pub use amount::Amount;
pub use matcher::{Captures, Matcher, Predicate, Verdict};
pub use transaction::{Posting, PostingType, Transaction};
pub use trigger::{Action, Trigger};

mod account;
mod amount;
mod matcher;
mod transaction;
mod trigger;
