//! Testing utilities backed by rusqlite.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`sqlite_outcome`]: run SQL in rusqlite and capture the result as an [`Outcome`]
//! - [`SqliteExecutor`]: a rusqlite [`Connection`] as a [`QueryExecutor`]
//! - [`HintFuzzInput`] and [`test_hint_invariants`]: the shared body of the
//!   `hint_invariants` fuzz harness and its regression tests

use alloc::string::{String, ToString};
use rusqlite::Connection;

use crate::comments;
use crate::errors::Error;
use crate::hint::{HintDirective, Reconciliation};
use crate::lexer::Lexer;
use crate::outcome::Outcome;
use crate::session::QueryExecutor;

/// Client error code reported for rusqlite errors that carry no SQLite code.
pub const CLIENT_ERROR: i32 = 1000;

/// Execute `sql` as a batch and describe the result.
///
/// SQLite failures, including errors raised while preparing the SQL, become
/// server errors carrying the extended result code (for example 1555 for a
/// primary key violation, 1 for a syntax error). Any other rusqlite error
/// becomes a client error with code [`CLIENT_ERROR`].
#[must_use]
pub fn sqlite_outcome(conn: &Connection, sql: &str) -> Outcome {
    match conn.execute_batch(sql) {
        Ok(()) => Outcome::success(),
        Err(rusqlite::Error::SqliteFailure(error, message)) => Outcome::server_error(
            error.extended_code,
            message.unwrap_or_else(|| error.to_string()),
        ),
        // Syntax errors and unknown tables are reported at prepare time.
        Err(rusqlite::Error::SqlInputError { error, msg, .. }) => {
            Outcome::server_error(error.extended_code, msg)
        }
        Err(other) => Outcome::client_error(CLIENT_ERROR, other.to_string()),
    }
}

/// A rusqlite connection used as the server side of a
/// [`Session`](crate::Session).
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Connection,
    reconnects: usize,
}

impl SqliteExecutor {
    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reconnect`] if SQLite cannot open the database.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(|error| Error::Reconnect {
            message: error.to_string(),
        })?;
        Ok(Self {
            conn,
            reconnects: 0,
        })
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of reconnects performed.
    #[must_use]
    pub fn reconnects(&self) -> usize {
        self.reconnects
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&mut self, query: &str) -> Outcome {
        sqlite_outcome(&self.conn, query)
    }

    /// In-memory databases cannot be reopened, so only the attempt is counted
    /// after checking that the connection still answers.
    fn reconnect(&mut self) -> Result<(), Error> {
        self.reconnects += 1;
        self.conn
            .execute_batch("SELECT 1")
            .map_err(|error| Error::Reconnect {
                message: error.to_string(),
            })
    }
}

/// Structured input of the `hint_invariants` fuzz harness.
#[derive(Debug, Clone, arbitrary::Arbitrary)]
pub struct HintFuzzInput {
    /// Whether test mode is on.
    pub enabled: bool,
    /// Query text, hint included.
    pub query: String,
    /// Observed server error code.
    pub server_error: i32,
    /// Observed client error code.
    pub client_error: i32,
    /// Whether an exception was observed.
    pub got_exception: bool,
}

/// Check the hint invariants on one input.
///
/// # Panics
///
/// Panics if lexing does not tile the query, if a disabled hint changes the
/// outcome, or if a verdict disagrees with the expectations.
pub fn test_hint_invariants(input: &HintFuzzInput) {
    let comment_text = comments::extract(&input.query);
    let mut covered = 0;
    for token in Lexer::new(&input.query) {
        assert_eq!(token.span.start, covered, "gap before {token:?}");
        covered = token.span.end;
        if token.is_comment() {
            assert!(comment_text.contains(token.text));
        }
    }
    assert_eq!(covered, input.query.len());

    let mut hint = HintDirective::new(input.enabled, &input.query);
    let (expected_server, expected_client) = (hint.server_error(), hint.client_error());
    let original = Outcome {
        server_error: input.server_error,
        client_error: input.client_error,
        got_exception: input.got_exception,
        last_exception: input.got_exception.then_some(Error::Unreported),
    };
    let mut outcome = original.clone();

    match hint.reconcile(&mut outcome) {
        Reconciliation::Disabled => {
            assert!(!input.enabled);
            assert_eq!(outcome, original);
        }
        Reconciliation::Satisfied => {
            assert_eq!(
                (expected_server, expected_client),
                (input.server_error, input.client_error)
            );
            assert!(!outcome.got_exception && outcome.last_exception.is_none());
            assert!(!hint.expects_error());
            assert_eq!(hint.reconcile(&mut outcome), Reconciliation::PassThrough);
        }
        Reconciliation::Violated => {
            assert!(
                (expected_server != 0 && input.server_error == 0)
                    || (expected_client != 0 && input.client_error == 0)
            );
            assert!(outcome.got_exception);
            assert!(
                outcome
                    .last_exception
                    .as_ref()
                    .is_some_and(Error::is_lost_expectation)
            );
        }
        Reconciliation::PassThrough => assert_eq!(outcome, original),
    }
}
