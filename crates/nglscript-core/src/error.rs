//! Errors raised while building a script.
//!
//! Every variant is a structural mistake in how the builder was driven. None
//! of them are retried: they surface synchronously through `Result` and the
//! script under construction should be discarded.

use thiserror::Error;

/// Errors that can occur while constructing a script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    /// A block-taking function was called without naming the block's input.
    #[error("`{function}` takes a block but no `using` binding was given")]
    MissingBinding { function: String },

    /// A strict scope was asked for a name it has never seen.
    #[error("Unknown variable `{name}` in block scope")]
    UnknownVariable { name: String },

    /// A loosely-typed value has no NGLess literal form.
    #[error("Cannot encode {kind} as an NGLess value")]
    UnsupportedValue { kind: &'static str },

    /// A conditional branch or block body ended up with no statements.
    #[error("Empty {construct} body")]
    EmptyBody { construct: &'static str },

    /// A variable name is not a valid NGLess identifier.
    #[error("Invalid identifier `{0}`")]
    InvalidIdentifier(String),
}

/// Checks that `name` is usable as an NGLess variable name.
pub(crate) fn check_identifier(name: &str) -> Result<(), DslError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DslError::InvalidIdentifier(name.to_string()))
    }
}
