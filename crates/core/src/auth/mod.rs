//! Credential handling for catalogue users.

mod password;

pub use password::*;
