// User module
// Registered bank customers, the accounts they own and the validation
// applied when they are created.

mod profile;
mod validation;

pub use profile::User;
pub use validation::{is_valid_email, validate_email, validate_name, UserError};

/// Email regex pattern for validation
pub const EMAIL_REGEX: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
