//! Client-side loop running queries in (optionally) test mode.
//!
//! The session owns the decision flow around each query: build the hint, run
//! the query through a [`QueryExecutor`], reconcile once, ask the executor to
//! reconnect when the verdict says so, and surface whatever exception remains.
//! Connecting, sending queries and reconnecting are left to the executor.

use alloc::string::String;

use crate::errors::Error;
use crate::hint::{HintDirective, Reconciliation};
use crate::outcome::Outcome;
use crate::script::split_statements;

/// Something that can run queries against a server.
pub trait QueryExecutor {
    /// Run `query` and report what happened.
    fn execute(&mut self, query: &str) -> Outcome;

    /// Re-establish the connection after a reconciled failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reconnect`] (or any other error) if the connection
    /// cannot be restored.
    fn reconnect(&mut self) -> Result<(), Error>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &mut E {
    fn execute(&mut self, query: &str) -> Outcome {
        (**self).execute(query)
    }

    fn reconnect(&mut self) -> Result<(), Error> {
        (**self).reconnect()
    }
}

/// Session options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Parse and enforce `{ serverError N }` / `{ clientError N }` hints.
    pub test_mode: bool,
    /// Keep running after a query fails.
    pub ignore_error: bool,
}

impl SessionConfig {
    /// Enable or disable test mode.
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Enable or disable continuing after errors.
    #[must_use]
    pub fn with_ignore_error(mut self, ignore_error: bool) -> Self {
        self.ignore_error = ignore_error;
        self
    }
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Queries sent to the executor.
    pub executed: usize,
    /// Queries whose expected error occurred and was absorbed.
    pub absorbed: usize,
    /// Queries that succeeded although an error was expected.
    pub violated: usize,
    /// Queries that ended with an exception, violations included.
    pub failed: usize,
    /// Reconnects requested from the executor.
    pub reconnects: usize,
}

/// What happened to a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    /// The query text as executed.
    pub query: String,
    /// Expected server error parsed from the query, 0 if none.
    pub expected_server_error: i32,
    /// Expected client error parsed from the query, 0 if none.
    pub expected_client_error: i32,
    /// How the hint was reconciled.
    pub reconciliation: Reconciliation,
    /// The outcome after reconciliation.
    pub outcome: Outcome,
}

/// Runs queries through an executor, one hint per query.
#[derive(Debug)]
pub struct Session<E> {
    executor: E,
    config: SessionConfig,
    stats: SessionStats,
}

impl<E: QueryExecutor> Session<E> {
    /// Create a session over `executor`.
    #[must_use]
    pub fn new(executor: E, config: SessionConfig) -> Self {
        Self {
            executor,
            config,
            stats: SessionStats::default(),
        }
    }

    /// The session options.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Access the executor.
    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the session and return the executor.
    #[must_use]
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run one query and reconcile its hint.
    ///
    /// # Errors
    ///
    /// Returns the query's remaining exception if it failed (including the
    /// synthetic [`Error::SuccessWhenErrorExpected`]) and errors are not
    /// ignored, or the executor's error if reconnecting fails.
    pub fn run_query(&mut self, query: &str) -> Result<QueryReport, Error> {
        let mut hint = HintDirective::new(self.config.test_mode, query);
        let expected_server_error = hint.server_error();
        let expected_client_error = hint.client_error();

        let mut outcome = self.executor.execute(query);
        self.stats.executed += 1;

        let reconciliation = hint.reconcile(&mut outcome);
        match reconciliation {
            Reconciliation::Satisfied => self.stats.absorbed += 1,
            Reconciliation::Violated => self.stats.violated += 1,
            Reconciliation::Disabled | Reconciliation::PassThrough => {}
        }

        if !reconciliation.can_continue() {
            self.stats.reconnects += 1;
            self.executor.reconnect()?;
        }

        if outcome.got_exception {
            self.stats.failed += 1;
            if !self.config.ignore_error {
                return Err(outcome.last_exception.take().unwrap_or(Error::Unreported));
            }
            tracing::debug!(
                server_error = outcome.server_error,
                client_error = outcome.client_error,
                "ignoring failed query"
            );
        }

        Ok(QueryReport {
            query: query.into(),
            expected_server_error,
            expected_client_error,
            reconciliation,
            outcome,
        })
    }

    /// Run every statement of `script` in order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error of [`run_query`](Self::run_query).
    pub fn run_script(&mut self, script: &str) -> Result<SessionStats, Error> {
        for statement in split_statements(script) {
            self.run_query(statement)?;
        }
        Ok(self.stats)
    }
}
