//! Submodule defining the errors used across the crate.

use alloc::format;
use alloc::string::String;

/// Classification code for internal logic errors.
///
/// Carried by [`Error::SuccessWhenErrorExpected`] so that a test harness sees a
/// failing status when an expected error never occurred.
pub const LOGICAL_ERROR: i32 = 49;

/// Fixed message of the synthetic lost-expectation error.
pub const SUCCESS_WHEN_ERROR_EXPECTED: &str = "Success when error expected";

/// Errors observed or synthesized while running queries in test mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The server rejected the query.
    #[error("Code: {code}. {message}")]
    Server {
        /// Server error code.
        code: i32,
        /// Message reported by the server.
        message: String,
    },
    /// The client failed before or while sending the query.
    #[error("Code: {code}. {message}")]
    Client {
        /// Client error code.
        code: i32,
        /// Message reported by the client.
        message: String,
    },
    /// A hint expected an error but the query succeeded on that channel.
    #[error("{}", lost_expectation_message(.server_error, .client_error))]
    SuccessWhenErrorExpected {
        /// Expected server error code, 0 if none.
        server_error: i32,
        /// Expected client error code, 0 if none.
        client_error: i32,
    },
    /// The exception flag was raised without an exception object.
    #[error("Query failed without reporting an exception")]
    Unreported,
    /// Re-establishing the connection failed.
    #[error("Reconnect failed: {message}")]
    Reconnect {
        /// Description of the failure.
        message: String,
    },
}

impl Error {
    /// Numeric classification of the error.
    ///
    /// Server and client errors report their own code; every error produced by
    /// this crate reports [`LOGICAL_ERROR`].
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Error::Server { code, .. } | Error::Client { code, .. } => *code,
            Error::SuccessWhenErrorExpected { .. } | Error::Unreported | Error::Reconnect { .. } => {
                LOGICAL_ERROR
            }
        }
    }

    /// Returns whether this is the synthetic lost-expectation error.
    #[must_use]
    pub fn is_lost_expectation(&self) -> bool {
        matches!(self, Error::SuccessWhenErrorExpected { .. })
    }
}

// Field references in `#[error]` arguments are passed by reference.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn lost_expectation_message(server_error: &i32, client_error: &i32) -> String {
    let mut message = String::from(SUCCESS_WHEN_ERROR_EXPECTED);
    let expectations = [("server", *server_error), ("client", *client_error)];
    let mut separator = ": ";
    for (channel, code) in expectations {
        if code != 0 {
            message.push_str(&format!("{separator}{channel} error {code} expected"));
            separator = ", ";
        }
    }
    message
}
