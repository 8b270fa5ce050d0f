// Operator module
// Registry of users and the operations the front-end drives. All user and
// account selections arriving here are 1-based, matching the numbers shown
// at the terminal.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::account::{render_transaction, Account, AccountError, AccountType, TransactionType};
use crate::config::DisplayConfig;
use crate::user::{User, UserError};

/// What a 1-based selection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    User,
    Account,
}

impl fmt::Display for SelectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionTarget::User => write!(f, "user"),
            SelectionTarget::Account => write!(f, "account"),
        }
    }
}

/// Broad error categories reported to the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    InsufficientFunds,
    SelectionOutOfRange,
}

/// Operator errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperatorError {
    #[error("Invalid {target} selection: {index} (expected 1 to {available})")]
    SelectionOutOfRange {
        target: SelectionTarget,
        index: usize,
        available: usize,
    },

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    User(#[from] UserError),
}

impl OperatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperatorError::SelectionOutOfRange { .. } => ErrorKind::SelectionOutOfRange,
            OperatorError::Account(AccountError::InsufficientFunds { .. }) => {
                ErrorKind::InsufficientFunds
            }
            OperatorError::Account(AccountError::InvalidArgument(_)) => ErrorKind::InvalidArgument,
            OperatorError::User(_) => ErrorKind::InvalidArgument,
        }
    }
}

/// One row of the user listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub account_count: usize,
    pub total_balance: Decimal,
}

/// One row of a user's account listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account_type: AccountType,
    pub balance: Decimal,
}

/// One entry of an account's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub timestamp: DateTime<Utc>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
}

impl TransactionRecord {
    pub fn render(&self, display: &DisplayConfig) -> String {
        render_transaction(self.timestamp, self.transaction_type, self.amount, display)
    }
}

// Convert a 1-based selection into a vector index
fn resolve(
    target: SelectionTarget,
    index: usize,
    available: usize,
) -> Result<usize, OperatorError> {
    if index == 0 || index > available {
        return Err(OperatorError::SelectionOutOfRange { target, index, available });
    }
    Ok(index - 1)
}

/// Every user registered during this run, in registration order
#[derive(Debug, Default)]
pub struct Registry {
    users: Vec<User>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Register a new user; nothing is added when validation fails
    pub fn create_user(&mut self, name: &str, email: &str) -> Result<&User, OperatorError> {
        let user = User::new(name, email)?;
        self.users.push(user);

        let user = &self.users[self.users.len() - 1];
        info!("Registered user #{}: {}", self.users.len(), user);
        Ok(user)
    }

    pub fn select_user(&self, user_index: usize) -> Result<&User, OperatorError> {
        let index = resolve(SelectionTarget::User, user_index, self.users.len())?;
        Ok(&self.users[index])
    }

    fn select_user_mut(&mut self, user_index: usize) -> Result<&mut User, OperatorError> {
        let index = resolve(SelectionTarget::User, user_index, self.users.len())?;
        Ok(&mut self.users[index])
    }

    pub fn select_account(
        &self,
        user_index: usize,
        account_index: usize,
    ) -> Result<&Account, OperatorError> {
        let user = self.select_user(user_index)?;
        let index = resolve(SelectionTarget::Account, account_index, user.account_count())?;
        Ok(&user.accounts()[index])
    }

    fn select_account_mut(
        &mut self,
        user_index: usize,
        account_index: usize,
    ) -> Result<&mut Account, OperatorError> {
        let user = self.select_user_mut(user_index)?;
        let index = resolve(SelectionTarget::Account, account_index, user.account_count())?;
        Ok(&mut user.accounts_mut()[index])
    }

    /// Open an account of `account_type` for the selected user
    pub fn create_account(
        &mut self,
        user_index: usize,
        account_type: AccountType,
        initial_deposit: Decimal,
    ) -> Result<&Account, OperatorError> {
        let user = self.select_user_mut(user_index)?;
        let account = Account::new(account_type, initial_deposit)?;
        user.add_account(account);

        let accounts = user.accounts();
        Ok(&accounts[accounts.len() - 1])
    }

    pub fn deposit(
        &mut self,
        user_index: usize,
        account_index: usize,
        amount: Decimal,
    ) -> Result<Decimal, OperatorError> {
        debug!("Deposit requested for user {} account {}", user_index, account_index);
        let account = self.select_account_mut(user_index, account_index)?;
        Ok(account.deposit(amount)?)
    }

    pub fn withdraw(
        &mut self,
        user_index: usize,
        account_index: usize,
        amount: Decimal,
    ) -> Result<Decimal, OperatorError> {
        debug!("Withdrawal requested for user {} account {}", user_index, account_index);
        let account = self.select_account_mut(user_index, account_index)?;
        Ok(account.withdraw(amount)?)
    }

    pub fn list_users(&self) -> Vec<UserSummary> {
        self.users
            .iter()
            .map(|user| UserSummary {
                name: user.name().to_string(),
                email: user.email().to_string(),
                account_count: user.account_count(),
                total_balance: user.total_balance(),
            })
            .collect()
    }

    pub fn list_accounts(&self, user_index: usize) -> Result<Vec<AccountSummary>, OperatorError> {
        let user = self.select_user(user_index)?;
        Ok(user
            .accounts()
            .iter()
            .map(|account| AccountSummary {
                account_type: account.account_type(),
                balance: account.balance(),
            })
            .collect())
    }

    /// History of the selected account, oldest first
    pub fn transaction_history(
        &self,
        user_index: usize,
        account_index: usize,
    ) -> Result<Vec<TransactionRecord>, OperatorError> {
        let account = self.select_account(user_index, account_index)?;
        Ok(account
            .history()
            .iter()
            .map(|transaction| TransactionRecord {
                timestamp: transaction.timestamp(),
                transaction_type: transaction.transaction_type(),
                amount: transaction.amount(),
            })
            .collect())
    }
}
