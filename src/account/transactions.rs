use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::account::format_money;
use crate::config::{self, DisplayConfig};

/// Number of fraction digits a monetary amount may carry
pub const CURRENCY_SCALE: u32 = 2;

/// Transaction validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction amount must be a positive number, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Transaction amount {0} has more than two decimal places")]
    ExcessPrecision(Decimal),
}

/// Kind of monetary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Check that `amount` is usable as a movement of money and return it normalized.
///
/// Trailing zeros are stripped first, so `5.000` is accepted while `0.001` is not.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, TransactionError> {
    if amount <= Decimal::ZERO {
        return Err(TransactionError::NonPositiveAmount(amount));
    }

    let normalized = amount.normalize();
    if normalized.scale() > CURRENCY_SCALE {
        return Err(TransactionError::ExcessPrecision(amount));
    }

    Ok(normalized)
}

/// Immutable record of one deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    id: Uuid,
    amount: Decimal,
    transaction_type: TransactionType,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        amount: Decimal,
        transaction_type: TransactionType,
    ) -> Result<Self, TransactionError> {
        let amount = validate_amount(amount)?;

        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            transaction_type,
            timestamp: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn render(&self, display: &DisplayConfig) -> String {
        render_transaction(self.timestamp, self.transaction_type, self.amount, display)
    }
}

/// Render one history line as `<timestamp> - <KIND>: <prefix><amount>`
pub fn render_transaction(
    timestamp: DateTime<Utc>,
    transaction_type: TransactionType,
    amount: Decimal,
    display: &DisplayConfig,
) -> String {
    format!(
        "{} - {}: {}",
        timestamp.format(&display.timestamp_format),
        transaction_type,
        format_money(amount, &display.currency_prefix)
    )
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(&config::get_config().display))
    }
}
