// Account module
// Bank accounts, their withdrawal rules and the transactions they record.

mod management;
mod transactions;

use rust_decimal::Decimal;

pub use management::{
    Account, AccountError, AccountType,
    CURRENT_MINIMUM_BALANCE, SAVINGS_MINIMUM_BALANCE, STUDENT_MINIMUM_BALANCE,
};
pub use transactions::{
    render_transaction, validate_amount, Transaction, TransactionError, TransactionType,
    CURRENCY_SCALE,
};

/// Format an amount with two fraction digits after the given currency prefix
pub fn format_money(amount: Decimal, currency_prefix: &str) -> String {
    format!("{}{:.2}", currency_prefix, amount)
}
