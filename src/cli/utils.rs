use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

/// Line-oriented terminal the menu talks to
#[cfg_attr(test, mockall::automock)]
pub trait Terminal {
    /// Show `prompt` and read one line; `None` once input is exhausted
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn print(&mut self, text: &str);
}

/// `Terminal` bound to the process's stdin and stdout
pub struct StdTerminal {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdTerminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{}", prompt);
        self.stdout.flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = self
            .stdin
            .lock()
            .read_line(&mut input)
            .context("Failed to read from stdin")?;

        if read == 0 {
            return Ok(None);
        }

        Ok(Some(input.trim().to_string()))
    }

    fn print(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Print a section header
pub fn print_header(terminal: &mut dyn Terminal, title: &str) {
    terminal.print("");
    terminal.print(&format!("--- {} ---", title));
}

/// Ask a yes/no question; only `y` (any case) counts as yes
pub fn confirm(terminal: &mut dyn Terminal, prompt: &str) -> Result<bool> {
    Ok(terminal
        .read_line(prompt)?
        .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
        .unwrap_or(false))
}

/// Keep prompting until `parse` accepts the input or the user declines to try again.
///
/// Rejections are printed before the retry question. Returns `None` when the
/// user gives up or input runs out.
pub fn prompt_until<T, F>(
    terminal: &mut dyn Terminal,
    prompt: &str,
    mut parse: F,
) -> Result<Option<T>>
where
    F: FnMut(&str) -> Result<T, String>,
{
    loop {
        let input = match terminal.read_line(prompt)? {
            Some(input) => input,
            None => return Ok(None),
        };

        match parse(input.trim()) {
            Ok(value) => return Ok(Some(value)),
            Err(message) => terminal.print(&message),
        }

        if !confirm(terminal, "Try again? (y/n): ")? {
            return Ok(None);
        }
    }
}

/// Parse a 1-based list position
pub fn parse_index(input: &str) -> Result<usize, String> {
    input
        .parse::<usize>()
        .map_err(|_| "Invalid input. Please enter a number.".to_string())
}

/// Parse a decimal amount, leaving range checks to the caller
pub fn parse_amount(input: &str) -> Result<Decimal, String> {
    Decimal::from_str(input).map_err(|_| "Invalid input. Please enter a number.".to_string())
}
