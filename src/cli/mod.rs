// Command line front-end
// Text menu that collects input, calls into the registry and prints the
// results or the errors it returns.

pub mod menu;
pub mod utils;

pub use menu::{Menu, MenuOption};
pub use utils::{StdTerminal, Terminal};
