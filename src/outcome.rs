//! The observed result of running one query.

use alloc::string::String;

use crate::errors::Error;

/// Runtime facts about a finished query, handed to
/// [`HintDirective::check`](crate::HintDirective::check).
///
/// Error codes use 0 for "no error". Reconciliation may clear or replace
/// [`got_exception`](Self::got_exception) and
/// [`last_exception`](Self::last_exception); the codes are never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Error code returned by the server, 0 if none.
    pub server_error: i32,
    /// Error code raised by the client, 0 if none.
    pub client_error: i32,
    /// Whether an exception occurred while running the query.
    pub got_exception: bool,
    /// The last exception raised, owned by the outcome.
    pub last_exception: Option<Error>,
}

impl Outcome {
    /// A query that completed without error.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// A query the server rejected with `code`.
    #[must_use]
    pub fn server_error(code: i32, message: impl Into<String>) -> Self {
        Self {
            server_error: code,
            client_error: 0,
            got_exception: true,
            last_exception: Some(Error::Server {
                code,
                message: message.into(),
            }),
        }
    }

    /// A query the client failed with `code`.
    #[must_use]
    pub fn client_error(code: i32, message: impl Into<String>) -> Self {
        Self {
            server_error: 0,
            client_error: code,
            got_exception: true,
            last_exception: Some(Error::Client {
                code,
                message: message.into(),
            }),
        }
    }

    /// Returns whether no error was observed on either channel.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.server_error == 0 && self.client_error == 0 && !self.got_exception
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Outcome::success().is_success());

        let outcome = Outcome::server_error(60, "Table doesn't exist");
        assert_eq!(outcome.server_error, 60);
        assert_eq!(outcome.client_error, 0);
        assert!(outcome.got_exception);
        assert_eq!(outcome.last_exception.as_ref().map(Error::code), Some(60));
        assert!(!outcome.is_success());

        let outcome = Outcome::client_error(20, "Syntax error");
        assert_eq!((outcome.server_error, outcome.client_error), (0, 20));
    }
}
