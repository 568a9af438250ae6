//! Password hashing and bearer token issuance/verification.

pub mod password;
pub mod token;

pub use self::password::PasswordError;
pub use self::token::{Claims, TokenError, TokenIssuer};
