use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::account::transactions::{validate_amount, Transaction, TransactionError, TransactionType};

/// Lowest balance a savings account may be left with after a withdrawal
pub const SAVINGS_MINIMUM_BALANCE: Decimal = dec!(100.00);

/// Lowest balance a current account may be left with after a withdrawal
pub const CURRENT_MINIMUM_BALANCE: Decimal = dec!(0.00);

/// Lowest balance a student account may be left with after a withdrawal
pub const STUDENT_MINIMUM_BALANCE: Decimal = dec!(0.00);

/// Account errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient balance! Available: {available:.2}, Needed: {requested:.2}, Minimum balance: {minimum:.2}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
        minimum: Decimal,
    },
}

impl From<TransactionError> for AccountError {
    fn from(error: TransactionError) -> Self {
        AccountError::InvalidArgument(error.to_string())
    }
}

/// Account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountType {
    Savings,
    Current,
    Student,
}

impl AccountType {
    /// Menu order: the position (1-based) is the choice number
    pub const MENU: [AccountType; 3] =
        [AccountType::Savings, AccountType::Student, AccountType::Current];

    pub fn as_str(&self) -> &str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Current => "current",
            AccountType::Student => "student",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AccountType::Savings => "Savings Account",
            AccountType::Current => "Current Account",
            AccountType::Student => "Student Account",
        }
    }

    /// Floor the balance must stay at or above after a withdrawal
    pub fn minimum_balance(&self) -> Decimal {
        match self {
            AccountType::Savings => SAVINGS_MINIMUM_BALANCE,
            AccountType::Current => CURRENT_MINIMUM_BALANCE,
            AccountType::Student => STUDENT_MINIMUM_BALANCE,
        }
    }

    pub fn from_menu_choice(choice: usize) -> Result<Self, AccountError> {
        choice
            .checked_sub(1)
            .and_then(|index| Self::MENU.get(index))
            .copied()
            .ok_or_else(|| {
                AccountError::InvalidArgument(format!("Invalid account type choice: {}", choice))
            })
    }
}

impl FromStr for AccountType {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(AccountType::Savings),
            "current" => Ok(AccountType::Current),
            "student" => Ok(AccountType::Student),
            _ => Err(AccountError::InvalidArgument(format!("Invalid account type: {}", s))),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A bank account owned by a single user.
///
/// The balance only ever changes together with an entry appended to the
/// history, so it always equals the sum of deposits minus withdrawals.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    id: Uuid,
    account_type: AccountType,
    balance: Decimal,
    history: Vec<Transaction>,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Open an account, recording a positive opening balance as its first deposit
    pub fn new(account_type: AccountType, initial_balance: Decimal) -> Result<Self, AccountError> {
        if initial_balance < Decimal::ZERO {
            return Err(AccountError::InvalidArgument(
                "Initial balance must be a non-negative number".to_string(),
            ));
        }

        let mut account = Self {
            id: Uuid::new_v4(),
            account_type,
            balance: Decimal::ZERO,
            history: Vec::new(),
            created_at: Utc::now(),
        };

        if initial_balance > Decimal::ZERO {
            account.record(Transaction::new(initial_balance, TransactionType::Deposit)?)?;
        }

        info!(
            "{} {} opened with balance {:.2}",
            account.account_type.label(),
            account.id,
            account.balance
        );

        Ok(account)
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, AccountError> {
        debug!("Processing deposit of {} on account {}", amount, self.id);

        let transaction = Transaction::new(amount, TransactionType::Deposit).map_err(|e| {
            warn!("Rejected deposit on account {}: {}", self.id, e);
            AccountError::from(e)
        })?;
        self.record(transaction).map_err(|e| {
            warn!("Rejected deposit on account {}: {}", self.id, e);
            e
        })?;

        Ok(self.balance)
    }

    /// Withdraw `amount` if the balance left behind stays at or above the
    /// account type's minimum balance.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, AccountError> {
        debug!("Processing withdrawal of {} on account {}", amount, self.id);

        let amount = validate_amount(amount).map_err(|e| {
            warn!("Rejected withdrawal on account {}: {}", self.id, e);
            AccountError::from(e)
        })?;

        let minimum = self.account_type.minimum_balance();
        if self.balance - amount < minimum {
            warn!(
                "Rejected withdrawal of {:.2} on account {}: balance {:.2}, minimum {:.2}",
                amount, self.id, self.balance, minimum
            );
            return Err(AccountError::InsufficientFunds {
                available: self.balance,
                requested: amount,
                minimum,
            });
        }

        self.record(Transaction::new(amount, TransactionType::Withdraw)?)?;

        Ok(self.balance)
    }

    // Sole mutation point for balance and history; nothing changes on overflow
    fn record(&mut self, transaction: Transaction) -> Result<(), AccountError> {
        let balance = match transaction.transaction_type() {
            TransactionType::Deposit => self.balance.checked_add(transaction.amount()),
            TransactionType::Withdraw => self.balance.checked_sub(transaction.amount()),
        };
        self.balance = balance.ok_or_else(|| {
            AccountError::InvalidArgument(format!(
                "{} of {:.2} would overflow the balance of {:.2}",
                transaction.transaction_type().as_str(),
                transaction.amount(),
                self.balance
            ))
        })?;

        debug!("Account {} recorded {}, balance now {:.2}", self.id, transaction, self.balance);

        self.history.push(transaction);
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Transactions, oldest first
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_savings_scenario() {
        let mut account = Account::new(AccountType::Savings, dec!(500.00)).unwrap();
        assert_eq!(account.history().len(), 1);
        assert_eq!(account.history()[0].transaction_type(), TransactionType::Deposit);
        assert_eq!(account.history()[0].amount(), dec!(500.00));

        let result = account.withdraw(dec!(450.00));
        assert_eq!(
            result,
            Err(AccountError::InsufficientFunds {
                available: dec!(500.00),
                requested: dec!(450.00),
                minimum: dec!(100.00),
            })
        );
        assert_eq!(account.balance(), dec!(500.00));
        assert_eq!(account.history().len(), 1);

        assert_eq!(account.withdraw(dec!(300.00)), Ok(dec!(200.00)));
        assert_eq!(account.history().len(), 2);
    }

    #[test]
    fn test_current_account_can_be_emptied() {
        let mut account = Account::new(AccountType::Current, dec!(0.00)).unwrap();
        assert!(account.history().is_empty());

        assert_eq!(account.deposit(dec!(50.00)), Ok(dec!(50.00)));
        assert_eq!(account.withdraw(dec!(50.00)), Ok(dec!(0.00)));
        assert_eq!(account.history().len(), 2);
    }

    #[test]
    fn test_student_account_cannot_go_negative() {
        let mut account = Account::new(AccountType::Student, Decimal::ZERO).unwrap();

        let result = account.withdraw(dec!(0.01));
        assert!(matches!(result, Err(AccountError::InsufficientFunds { .. })));
        assert_eq!(account.balance(), Decimal::ZERO);
    }

    #[rstest]
    #[case(AccountType::Savings, dec!(300), dec!(200), true)]
    #[case(AccountType::Savings, dec!(300), dec!(200.01), false)]
    #[case(AccountType::Current, dec!(300), dec!(300), true)]
    #[case(AccountType::Current, dec!(300), dec!(300.01), false)]
    #[case(AccountType::Student, dec!(300), dec!(300), true)]
    #[case(AccountType::Student, dec!(300), dec!(300.01), false)]
    fn test_withdrawal_floor_per_type(
        #[case] account_type: AccountType,
        #[case] opening: Decimal,
        #[case] amount: Decimal,
        #[case] allowed: bool,
    ) {
        let mut account = Account::new(account_type, opening).unwrap();
        let result = account.withdraw(amount);

        assert_eq!(result.is_ok(), allowed);
        if !allowed {
            assert_eq!(account.balance(), opening);
        }
    }

    #[rstest]
    #[case(dec!(-5))]
    #[case(dec!(0))]
    #[case(dec!(0.005))]
    fn test_invalid_amounts_leave_account_untouched(#[case] amount: Decimal) {
        let mut account = Account::new(AccountType::Current, dec!(20)).unwrap();

        assert!(matches!(account.deposit(amount), Err(AccountError::InvalidArgument(_))));
        assert!(matches!(account.withdraw(amount), Err(AccountError::InvalidArgument(_))));
        assert_eq!(account.balance(), dec!(20));
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn test_negative_opening_balance_rejected() {
        let result = Account::new(AccountType::Savings, dec!(-1));
        assert!(matches!(result, Err(AccountError::InvalidArgument(_))));
    }

    #[test]
    fn test_opening_balance_precision_checked() {
        let result = Account::new(AccountType::Current, dec!(10.001));
        assert!(matches!(result, Err(AccountError::InvalidArgument(_))));
    }

    #[test]
    fn test_deposit_has_no_upper_bound() {
        let mut account = Account::new(AccountType::Student, Decimal::ZERO).unwrap();
        assert_eq!(account.deposit(dec!(1000000000.00)), Ok(dec!(1000000000)));
    }

    #[test]
    fn test_deposit_overflow_leaves_account_untouched() {
        let mut account = Account::new(AccountType::Current, Decimal::MAX).unwrap();

        let result = account.deposit(dec!(1));

        assert!(matches!(result, Err(AccountError::InvalidArgument(_))));
        assert_eq!(account.balance(), Decimal::MAX);
        assert_eq!(account.history().len(), 1);

        assert_eq!(account.withdraw(dec!(1)), Ok(Decimal::MAX - dec!(1)));
        assert_eq!(account.deposit(dec!(1)), Ok(Decimal::MAX));
        assert_eq!(account.history().len(), 3);
    }

    #[rstest]
    #[case(1, AccountType::Savings)]
    #[case(2, AccountType::Student)]
    #[case(3, AccountType::Current)]
    fn test_menu_choice_mapping(#[case] choice: usize, #[case] expected: AccountType) {
        assert_eq!(AccountType::from_menu_choice(choice), Ok(expected));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    fn test_invalid_menu_choice(#[case] choice: usize) {
        assert!(matches!(
            AccountType::from_menu_choice(choice),
            Err(AccountError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!("Savings".parse::<AccountType>(), Ok(AccountType::Savings));
        assert_eq!(" student ".parse::<AccountType>(), Ok(AccountType::Student));
        assert!("checking".parse::<AccountType>().is_err());
        assert_eq!(AccountType::Current.to_string(), "Current Account");
    }

    fn operation() -> impl Strategy<Value = (bool, Decimal)> {
        (any::<bool>(), 1i64..50_000)
            .prop_map(|(is_deposit, cents)| (is_deposit, Decimal::new(cents, 2)))
    }

    proptest! {
        #[test]
        fn prop_balance_matches_history(
            opening_cents in 0i64..100_000,
            ops in proptest::collection::vec(operation(), 0..40),
            type_index in 0usize..3,
        ) {
            let opening = Decimal::new(opening_cents, 2);
            let mut account = Account::new(AccountType::MENU[type_index], opening).unwrap();
            let mut expected = opening;
            let mut successes = 0usize;

            for (is_deposit, amount) in ops {
                let before = account.balance();
                let result = if is_deposit {
                    account.deposit(amount)
                } else {
                    account.withdraw(amount)
                };
                match result {
                    Ok(balance) => {
                        expected = if is_deposit { expected + amount } else { expected - amount };
                        prop_assert_eq!(balance, expected);
                        if !is_deposit {
                            prop_assert!(balance >= account.account_type().minimum_balance());
                        }
                        successes += 1;
                    }
                    Err(_) => prop_assert_eq!(account.balance(), before),
                }
            }

            prop_assert_eq!(account.balance(), expected);
            let opening_entries = if opening > Decimal::ZERO { 1 } else { 0 };
            prop_assert_eq!(account.history().len(), successes + opening_entries);

            let replayed: Decimal = account.history().iter().map(|t| match t.transaction_type() {
                TransactionType::Deposit => t.amount(),
                TransactionType::Withdraw => -t.amount(),
            }).sum();
            prop_assert_eq!(replayed, account.balance());
        }
    }
}
