use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::account::{format_money, Account};
use crate::config;
use crate::user::validation::{validate_email, validate_name, UserError};

/// A registered customer and the accounts they own, in the order they were opened
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: Uuid,
    name: String,
    email: String,
    accounts: Vec<Account>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a user after validating the name and email.
    ///
    /// Both are fixed from here on; nothing re-validates or renames them.
    pub fn new(name: &str, email: &str) -> Result<Self, UserError> {
        validate_name(name)?;
        validate_email(email)?;

        let user = Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            accounts: Vec::new(),
            created_at: Utc::now(),
        };

        info!("User {} created: {}", user.id, user.name);
        Ok(user)
    }

    pub fn add_account(&mut self, account: Account) {
        info!("Adding {} {} to user {}", account.account_type().label(), account.id(), self.id);
        self.accounts.push(account);
    }

    /// Sum of all account balances, recomputed on every call.
    ///
    /// Saturates at `Decimal::MAX` when the exact sum is not representable;
    /// use `checked_total_balance` to tell the two apart.
    pub fn total_balance(&self) -> Decimal {
        self.checked_total_balance().unwrap_or(Decimal::MAX)
    }

    /// Exact sum of all account balances, `None` on overflow
    pub fn checked_total_balance(&self) -> Option<Decimal> {
        self.accounts
            .iter()
            .try_fold(Decimal::ZERO, |total, account| total.checked_add(account.balance()))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub(crate) fn accounts_mut(&mut self) -> &mut [Account] {
        &mut self.accounts
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = config::get_config().display.currency_prefix;
        write!(
            f,
            "{} ({}) - {} account(s), Total Balance: {}",
            self.name,
            self.email,
            self.account_count(),
            format_money(self.total_balance(), &prefix)
        )
    }
}
