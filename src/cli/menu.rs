use anyhow::Result;
use log::debug;
use rust_decimal::Decimal;

use crate::account::{format_money, AccountType};
use crate::cli::utils::{parse_amount, parse_index, print_header, prompt_until, Terminal};
use crate::config::Config;
use crate::operator::Registry;

/// Main menu entries, numbered as shown on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    CreateUser,
    ListUsers,
    AddAccount,
    Deposit,
    Withdraw,
    ViewTransactions,
    Exit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 7] = [
        MenuOption::CreateUser,
        MenuOption::ListUsers,
        MenuOption::AddAccount,
        MenuOption::Deposit,
        MenuOption::Withdraw,
        MenuOption::ViewTransactions,
        MenuOption::Exit,
    ];

    pub fn description(&self) -> &str {
        match self {
            MenuOption::CreateUser => "Create User",
            MenuOption::ListUsers => "List Users",
            MenuOption::AddAccount => "Add Account",
            MenuOption::Deposit => "Deposit",
            MenuOption::Withdraw => "Withdraw",
            MenuOption::ViewTransactions => "View Transactions",
            MenuOption::Exit => "Exit",
        }
    }

    /// Parse a menu choice; empty input picks Exit
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(MenuOption::Exit);
        }

        input
            .parse::<usize>()
            .ok()
            .and_then(|choice| choice.checked_sub(1))
            .and_then(|index| Self::ALL.get(index))
            .copied()
            .ok_or_else(|| {
                format!("Please select one of the available options (1-{})", Self::ALL.len())
            })
    }
}

/// Interactive front-end over a `Registry`
pub struct Menu<'a> {
    terminal: &'a mut dyn Terminal,
    registry: &'a mut Registry,
    config: Config,
}

impl<'a> Menu<'a> {
    pub fn new(terminal: &'a mut dyn Terminal, registry: &'a mut Registry, config: Config) -> Self {
        Self { terminal, registry, config }
    }

    /// Run until the user picks Exit or input ends
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.render();

            let choice = match self.terminal.read_line("Choose option [1-7] (7): ")? {
                Some(choice) => choice,
                None => break,
            };

            let option = match MenuOption::parse(&choice) {
                Ok(option) => option,
                Err(message) => {
                    self.terminal.print(&message);
                    continue;
                }
            };

            debug!("Menu option selected: {:?}", option);
            self.terminal.print(&"-".repeat(30));

            match option {
                MenuOption::CreateUser => self.create_user()?,
                MenuOption::ListUsers => self.list_users(),
                MenuOption::AddAccount => self.add_account()?,
                MenuOption::Deposit => self.deposit()?,
                MenuOption::Withdraw => self.withdraw()?,
                MenuOption::ViewTransactions => self.view_transactions()?,
                MenuOption::Exit => {
                    let farewell =
                        format!("Exiting... Thank you for using {}!", self.config.app_name);
                    self.terminal.print(&farewell);
                    break;
                }
            }

            if self.terminal.read_line("\nPress Enter to continue...")?.is_none() {
                break;
            }
        }

        Ok(())
    }

    fn render(&mut self) {
        print_header(self.terminal, &format!("{} Menu", self.config.app_name));
        for (i, option) in MenuOption::ALL.iter().enumerate() {
            self.terminal.print(&format!("{:^6} {}", i + 1, option.description()));
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format_money(amount, &self.config.display.currency_prefix)
    }

    fn create_user(&mut self) -> Result<()> {
        print_header(self.terminal, "Create New User");

        let name = match self.terminal.read_line("Enter name: ")? {
            Some(name) => name,
            None => return Ok(()),
        };
        let email = match self.terminal.read_line("Enter email: ")? {
            Some(email) => email,
            None => return Ok(()),
        };

        match self.registry.create_user(&name, &email) {
            Ok(user) => {
                let message = format!("User '{}' created successfully.", user.name());
                self.terminal.print(&message);
            }
            Err(e) => self.terminal.print(&format!("Error creating user: {}", e)),
        }

        Ok(())
    }

    fn list_users(&mut self) {
        print_header(self.terminal, "List of Users");

        let users = self.registry.list_users();
        if users.is_empty() {
            self.terminal.print("No users in the system yet.");
            return;
        }

        for (i, user) in users.iter().enumerate() {
            let line = format!(
                "{}. {} ({}) - {} account(s), Total Balance: {}",
                i + 1,
                user.name,
                user.email,
                user.account_count,
                self.money(user.total_balance)
            );
            self.terminal.print(&line);
        }
        self.terminal.print(&"-".repeat(20));
    }

    /// List users and ask for one; `None` when there are none or the user cancels
    fn choose_user(&mut self, prompt: &str) -> Result<Option<usize>> {
        if self.registry.is_empty() {
            self.terminal.print("No users available. Please create a user first.");
            return Ok(None);
        }

        self.list_users();

        let registry = &*self.registry;
        prompt_until(self.terminal, prompt, |input| {
            let index = parse_index(input)?;
            registry.select_user(index).map(|_| index).map_err(|e| e.to_string())
        })
    }

    /// List a user's accounts and ask for one
    fn choose_account(&mut self, user_index: usize, prompt: &str) -> Result<Option<usize>> {
        let user = self.registry.select_user(user_index)?;
        let name = user.name().to_string();

        let accounts = self.registry.list_accounts(user_index)?;
        if accounts.is_empty() {
            self.terminal.print(&format!("User {} has no accounts.", name));
            return Ok(None);
        }

        self.terminal.print(&format!("\nAccounts for {}:", name));
        for (i, account) in accounts.iter().enumerate() {
            let line = format!(
                "{}. {} - Balance: {}",
                i + 1,
                account.account_type,
                self.money(account.balance)
            );
            self.terminal.print(&line);
        }

        let registry = &*self.registry;
        prompt_until(self.terminal, prompt, |input| {
            let index = parse_index(input)?;
            registry
                .select_account(user_index, index)
                .map(|_| index)
                .map_err(|e| e.to_string())
        })
    }

    fn add_account(&mut self) -> Result<()> {
        print_header(self.terminal, "Add New Account");

        let user_index = match self.choose_user("Select user to add account for: ")? {
            Some(index) => index,
            None => return Ok(()),
        };

        self.terminal.print("\nSelect Account Type:");
        for (i, account_type) in AccountType::MENU.iter().enumerate() {
            self.terminal.print(&format!("{}. {}", i + 1, account_type.label()));
        }

        let account_type = prompt_until(self.terminal, "Enter your choice (1, 2, 3): ", |input| {
            let parsed = match input.parse::<usize>() {
                Ok(choice) => AccountType::from_menu_choice(choice),
                Err(_) => input.parse::<AccountType>(),
            };
            parsed.map_err(|_| "Invalid account type!".to_string())
        })?;
        let account_type = match account_type {
            Some(account_type) => account_type,
            None => return Ok(()),
        };

        let prompt = "Enter initial deposit amount (>= 0): ";
        let initial_deposit = prompt_until(self.terminal, prompt, |input| {
            let amount = parse_amount(input)?;
            if amount < Decimal::ZERO {
                return Err("Amount cannot be negative.".to_string());
            }
            Ok(amount)
        })?;
        let initial_deposit = match initial_deposit {
            Some(amount) => amount,
            None => {
                self.terminal.print("Account creation cancelled.");
                return Ok(());
            }
        };

        match self.registry.create_account(user_index, account_type, initial_deposit) {
            Ok(account) => {
                let message = format!("{} created successfully.", account.account_type().label());
                self.terminal.print(&message);
            }
            Err(e) => self.terminal.print(&format!("Error creating account: {}", e)),
        }

        Ok(())
    }

    /// Shared user/account/amount selection for deposit and withdraw
    fn choose_movement(&mut self, verb: &str) -> Result<Option<(usize, usize, Decimal)>> {
        let user_index = match self.choose_user(&format!("Select user for {}: ", verb))? {
            Some(index) => index,
            None => return Ok(None),
        };

        let prompt = format!("Select account for {}: ", verb);
        let account_index = match self.choose_account(user_index, &prompt)? {
            Some(index) => index,
            None => return Ok(None),
        };

        let amount = prompt_until(self.terminal, &format!("Enter amount for {}: ", verb), |input| {
            let amount = parse_amount(input)?;
            if amount <= Decimal::ZERO {
                return Err("Amount must be positive.".to_string());
            }
            Ok(amount)
        })?;
        match amount {
            Some(amount) => Ok(Some((user_index, account_index, amount))),
            None => {
                self.terminal.print(&format!("{} cancelled.", capitalize(verb)));
                Ok(None)
            }
        }
    }

    fn deposit(&mut self) -> Result<()> {
        print_header(self.terminal, "Deposit Money");

        let (user_index, account_index, amount) = match self.choose_movement("deposit")? {
            Some(selection) => selection,
            None => return Ok(()),
        };

        match self.registry.deposit(user_index, account_index, amount) {
            Ok(balance) => {
                let message = format!("Deposit successful. New balance: {}", self.money(balance));
                self.terminal.print(&message);
            }
            Err(e) => self.terminal.print(&format!("Deposit failed: {}", e)),
        }

        Ok(())
    }

    fn withdraw(&mut self) -> Result<()> {
        print_header(self.terminal, "Withdraw Money");

        let (user_index, account_index, amount) = match self.choose_movement("withdrawal")? {
            Some(selection) => selection,
            None => return Ok(()),
        };

        match self.registry.withdraw(user_index, account_index, amount) {
            Ok(balance) => {
                let message =
                    format!("Withdrawal successful. New balance: {}", self.money(balance));
                self.terminal.print(&message);
            }
            Err(e) => self.terminal.print(&format!("Withdrawal failed: {}", e)),
        }

        Ok(())
    }

    fn view_transactions(&mut self) -> Result<()> {
        print_header(self.terminal, "View Transactions");

        let user_index = match self.choose_user("Select user to view transactions: ")? {
            Some(index) => index,
            None => return Ok(()),
        };

        let name = self.registry.select_user(user_index)?.name().to_string();
        let accounts = self.registry.list_accounts(user_index)?;
        if accounts.is_empty() {
            self.terminal.print(&format!("User {} has no accounts.", name));
            return Ok(());
        }

        print_header(self.terminal, &format!("Transactions for {}", name));
        for (i, account) in accounts.iter().enumerate() {
            let line = format!(
                "\nAccount {}: {} - Current Balance: {}",
                i + 1,
                account.account_type,
                self.money(account.balance)
            );
            self.terminal.print(&line);

            let history = self.registry.transaction_history(user_index, i + 1)?;
            if history.is_empty() {
                self.terminal.print("  No transactions yet.");
            }
            for record in history {
                let line = format!("  {}", record.render(&self.config.display));
                self.terminal.print(&line);
            }
        }
        self.terminal.print(&"-".repeat(30));

        Ok(())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::utils::MockTerminal;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Run the menu over scripted input, returning everything it printed
    fn run_script(registry: &mut Registry, inputs: &[&str]) -> Vec<String> {
        let printed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&printed);

        let mut queue: VecDeque<String> = inputs.iter().map(|s| s.to_string()).collect();
        let mut terminal = MockTerminal::new();
        terminal.expect_read_line().returning(move |_| Ok(queue.pop_front()));
        terminal
            .expect_print()
            .returning(move |text| sink.lock().unwrap().push(text.to_string()));

        Menu::new(&mut terminal, registry, Config::default()).run().unwrap();

        let lines = printed.lock().unwrap().clone();
        lines
    }

    #[test]
    fn test_menu_option_parsing() {
        assert_eq!(MenuOption::parse("1"), Ok(MenuOption::CreateUser));
        assert_eq!(MenuOption::parse(" 6 "), Ok(MenuOption::ViewTransactions));
        assert_eq!(MenuOption::parse(""), Ok(MenuOption::Exit));
        assert!(MenuOption::parse("0").is_err());
        assert!(MenuOption::parse("8").is_err());
        assert!(MenuOption::parse("deposit").is_err());
    }

    #[test]
    fn test_exit_immediately() {
        let mut registry = Registry::new();
        let printed = run_script(&mut registry, &["7"]);

        assert!(printed.iter().any(|line| line.starts_with("Exiting...")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_user_and_list() {
        let mut registry = Registry::new();
        let printed = run_script(
            &mut registry,
            &["1", "Asha", "asha@example.com", "", "2", "", "7"],
        );

        assert_eq!(registry.user_count(), 1);
        assert!(printed.contains(&"User 'Asha' created successfully.".to_string()));
        let listing = "1. Asha (asha@example.com) - 0 account(s), Total Balance: Rs. 0.00";
        assert!(printed.contains(&listing.to_string()));
    }

    #[test]
    fn test_invalid_email_reports_error() {
        let mut registry = Registry::new();
        let printed = run_script(&mut registry, &["1", "Asha", "bademail", "", "7"]);

        assert!(registry.is_empty());
        assert!(printed
            .iter()
            .any(|line| line.starts_with("Error creating user: Invalid email format")));
    }

    #[test]
    fn test_add_account_deposit_and_withdraw() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();

        let printed = run_script(
            &mut registry,
            &[
                "3", "1", "1", "500", "",
                "5", "1", "1", "450", "",
                "5", "1", "1", "300", "",
                "4", "1", "1", "25.5", "",
                "7",
            ],
        );

        assert!(printed.contains(&"Savings Account created successfully.".to_string()));
        assert!(printed
            .iter()
            .any(|line| line.starts_with("Withdrawal failed: Insufficient balance!")));
        assert!(printed.contains(&"Withdrawal successful. New balance: Rs. 200.00".to_string()));
        assert!(printed.contains(&"Deposit successful. New balance: Rs. 225.50".to_string()));
        assert_eq!(registry.select_account(1, 1).unwrap().balance(), dec!(225.50));
    }

    #[test]
    fn test_account_type_by_name() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();

        run_script(&mut registry, &["3", "1", "student", "0", "", "7"]);

        let accounts = registry.list_accounts(1).unwrap();
        assert_eq!(accounts[0].account_type, AccountType::Student);
        assert_eq!(accounts[0].balance, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_user_then_cancel() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();

        let printed = run_script(&mut registry, &["4", "9", "n", "", "7"]);

        assert!(printed.contains(&"Invalid user selection: 9 (expected 1 to 1)".to_string()));
    }

    #[test]
    fn test_operations_without_users() {
        let mut registry = Registry::new();
        let printed = run_script(&mut registry, &["4", "", "7"]);

        assert!(printed.contains(&"No users available. Please create a user first.".to_string()));
    }

    #[test]
    fn test_non_positive_amount_is_asked_again() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();
        registry.create_account(1, AccountType::Current, dec!(10)).unwrap();

        let printed = run_script(
            &mut registry,
            &["4", "1", "1", "-5", "y", "0", "y", "2.5", "", "7"],
        );

        let rejections = printed.iter().filter(|line| *line == "Amount must be positive.").count();
        assert_eq!(rejections, 2);
        assert!(!printed.iter().any(|line| line.starts_with("Deposit failed")));
        assert!(printed.contains(&"Deposit successful. New balance: Rs. 12.50".to_string()));
        assert_eq!(registry.transaction_history(1, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_withdrawal_amount_declined_cancels() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();
        registry.create_account(1, AccountType::Current, dec!(10)).unwrap();

        let printed = run_script(&mut registry, &["5", "1", "1", "0", "n", "", "7"]);

        assert!(printed.contains(&"Amount must be positive.".to_string()));
        assert!(printed.contains(&"Withdrawal cancelled.".to_string()));
        assert_eq!(registry.select_account(1, 1).unwrap().balance(), dec!(10));
    }

    #[test]
    fn test_overflowing_deposit_is_reported() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();
        registry.create_account(1, AccountType::Current, Decimal::MAX).unwrap();

        let printed = run_script(&mut registry, &["4", "1", "1", "1", "", "2", "", "7"]);

        assert!(printed.iter().any(|line| line.starts_with("Deposit failed: Invalid argument")));
        assert_eq!(registry.select_account(1, 1).unwrap().balance(), Decimal::MAX);
        assert!(printed
            .iter()
            .any(|line| line.starts_with("1. Asha (asha@example.com) - 1 account(s)")));
    }

    #[test]
    fn test_view_transactions() {
        let mut registry = Registry::new();
        registry.create_user("Asha", "asha@example.com").unwrap();
        registry.create_account(1, AccountType::Savings, dec!(500)).unwrap();
        registry.create_account(1, AccountType::Current, Decimal::ZERO).unwrap();

        let printed = run_script(&mut registry, &["6", "1", "", "7"]);

        let heading = "\nAccount 1: Savings Account - Current Balance: Rs. 500.00";
        assert!(printed.contains(&heading.to_string()));
        assert!(printed.iter().any(|line| line.ends_with(" - DEPOSIT: Rs. 500.00")));
        assert!(printed.contains(&"  No transactions yet.".to_string()));
    }

    #[test]
    fn test_end_of_input_stops_menu() {
        let mut registry = Registry::new();
        let printed = run_script(&mut registry, &["2"]);

        assert!(printed.contains(&"No users in the system yet.".to_string()));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("withdrawal"), "Withdrawal");
        assert_eq!(capitalize(""), "");
    }
}
