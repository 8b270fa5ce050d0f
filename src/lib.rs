// Console Bank
// In-memory bank simulator. Users own savings, current and student accounts;
// each account keeps its balance together with an append-only transaction
// history, and withdrawals are checked against the account type's minimum.

pub mod account;
pub mod cli;
pub mod config;
pub mod operator;
pub mod user;

pub use account::{Account, AccountError, AccountType, Transaction, TransactionType};
pub use operator::{ErrorKind, OperatorError, Registry};
pub use user::{User, UserError};
