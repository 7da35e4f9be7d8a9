pub mod transaction;
pub mod user;

pub use transaction::{
    NewTransaction, Summary, Transaction, TransactionChanges, TransactionKind, TransactionPayload,
    TransactionTotals,
};
pub use user::{NewUser, Profile, User};
