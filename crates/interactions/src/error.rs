use std::fmt;

use crate::contact_form::Field;

/// Host-level failures: the page could not be reached or configured.
///
/// Missing markup (no navbar, no form, ...) is never an error; behaviors
/// simply skip wiring in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// A browser global (`window`, `document`, ...) does not exist.
    Unavailable(&'static str),
    Config(String),
    /// A JS call threw.
    Js(String),
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::Unavailable(what) => write!(f, "{what} is unavailable"),
            PageError::Config(msg) => write!(f, "invalid page config: {msg}"),
            PageError::Js(msg) => write!(f, "javascript error: {msg}"),
        }
    }
}

impl std::error::Error for PageError {}

impl From<serde_json::Error> for PageError {
    fn from(e: serde_json::Error) -> Self {
        PageError::Config(e.to_string())
    }
}

/// Why a contact form submission was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(Field),
    InvalidEmail,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "required field `{}` is empty", field.name())
            }
            ValidationError::InvalidEmail => write!(f, "email address is malformed"),
        }
    }
}

impl std::error::Error for ValidationError {}
