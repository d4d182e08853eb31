//! Expected-error hints embedded in query comments.
//!
//! In test mode a query may carry a trailing comment such as
//! `-- { serverError 60 }`, `-- { clientError 20 }` or
//! `-- { serverError 60, clientError 20 }`. [`HintDirective`] parses it before
//! the query runs and reconciles it with the observed [`Outcome`] afterwards.
//!
//! ```
//! use sql_test_hint::{HintDirective, Outcome};
//!
//! let mut hint = HintDirective::new(true, "SELECT * FROM missing -- { serverError 60 }");
//! let mut outcome = Outcome::server_error(60, "Table default.missing doesn't exist");
//!
//! // The expected error is absorbed: no reconnect, no exception left.
//! assert!(!hint.check(&mut outcome));
//! assert!(!outcome.got_exception);
//! assert!(outcome.last_exception.is_none());
//! ```

use crate::comments;
use crate::errors::Error;
use crate::lexer::Token;
use crate::outcome::Outcome;

/// Keywords understood inside a `{ ... }` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKeyword {
    /// `serverError N`
    ServerError,
    /// `clientError N`
    ClientError,
}

impl DirectiveKeyword {
    /// Match a directive word, case-sensitively.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "serverError" => Some(Self::ServerError),
            "clientError" => Some(Self::ClientError),
            _ => None,
        }
    }
}

impl AsRef<str> for DirectiveKeyword {
    fn as_ref(&self) -> &str {
        match self {
            Self::ServerError => "serverError",
            Self::ClientError => "clientError",
        }
    }
}

/// Result of reconciling a hint with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reconciliation {
    /// Test mode is off; nothing was checked.
    Disabled,
    /// The observed errors were exactly the expected ones and were absorbed.
    Satisfied,
    /// An expected error did not occur; a synthetic failure was raised.
    Violated,
    /// No decision: the outcome is left for the caller to handle.
    PassThrough,
}

impl Reconciliation {
    /// Returns whether the client may continue without reconnecting.
    #[must_use]
    pub fn can_continue(self) -> bool {
        matches!(self, Self::Disabled | Self::PassThrough)
    }
}

/// Expected server and client error codes for one query.
///
/// A code of 0 means "no expectation" on that channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintDirective {
    enabled: bool,
    server_error: i32,
    client_error: i32,
}

impl HintDirective {
    /// Build the hint for `query`.
    ///
    /// When `enabled` is false the query is not even tokenized and the hint
    /// accepts every outcome.
    #[must_use]
    pub fn new(enabled: bool, query: &str) -> Self {
        if !enabled {
            return Self::default();
        }
        Self::from_comment_text(&comments::extract(query))
    }

    /// Build an enabled hint from the tokens of an already lexed query.
    #[must_use]
    pub fn from_tokens<'input, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Token<'input>>,
    {
        Self::from_comment_text(&comments::extract_from(tokens))
    }

    fn from_comment_text(full_comment: &str) -> Self {
        let mut hint = Self {
            enabled: true,
            ..Self::default()
        };
        if let Some(body) = directive_body(full_comment) {
            hint.parse(body);
        }
        hint
    }

    /// Returns whether test mode is on for this hint.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Expected server error code, 0 if none.
    #[must_use]
    pub fn server_error(&self) -> i32 {
        self.server_error
    }

    /// Expected client error code, 0 if none.
    #[must_use]
    pub fn client_error(&self) -> i32 {
        self.client_error
    }

    /// Returns whether any error is expected.
    #[must_use]
    pub fn expects_error(&self) -> bool {
        self.server_error != 0 || self.client_error != 0
    }

    fn parse(&mut self, body: &str) {
        let mut words = body.split_whitespace();
        while let Some(word) = words.next() {
            let Some(keyword) = DirectiveKeyword::from_word(word) else {
                continue;
            };
            let Some(value) = words.next() else {
                break;
            };
            match leading_int(value) {
                Some(code) => *self.slot(keyword) = code,
                None => tracing::debug!(
                    keyword = keyword.as_ref(),
                    value,
                    "ignoring malformed hint value"
                ),
            }
        }
        tracing::trace!(
            server_error = self.server_error,
            client_error = self.client_error,
            "parsed test hint"
        );
    }

    fn slot(&mut self, keyword: DirectiveKeyword) -> &mut i32 {
        match keyword {
            DirectiveKeyword::ServerError => &mut self.server_error,
            DirectiveKeyword::ClientError => &mut self.client_error,
        }
    }

    /// Reconcile the expectations with the observed `outcome`.
    ///
    /// - [`Reconciliation::Satisfied`]: both codes equal the expected ones and
    ///   at least one was expected. The exception is discarded and the
    ///   expectations are reset, so a repeated check passes through.
    /// - [`Reconciliation::Violated`]: an error was expected on a channel that
    ///   reported none. The outcome now owns
    ///   [`Error::SuccessWhenErrorExpected`].
    /// - Otherwise the outcome is left untouched.
    pub fn reconcile(&mut self, outcome: &mut Outcome) -> Reconciliation {
        if !self.enabled {
            return Reconciliation::Disabled;
        }

        if self.all_errors_expected(outcome) {
            tracing::debug!(
                server_error = outcome.server_error,
                client_error = outcome.client_error,
                "expected error absorbed"
            );
            outcome.got_exception = false;
            outcome.last_exception = None;
            self.server_error = 0;
            self.client_error = 0;
            return Reconciliation::Satisfied;
        }

        if self.lost_expected_error(outcome) {
            tracing::warn!(
                server_error = self.server_error,
                client_error = self.client_error,
                "Success when error expected"
            );
            outcome.got_exception = true;
            outcome.last_exception = Some(Error::SuccessWhenErrorExpected {
                server_error: self.server_error,
                client_error: self.client_error,
            });
            return Reconciliation::Violated;
        }

        Reconciliation::PassThrough
    }

    /// Reconcile and return whether the client may continue without
    /// reconnecting. See [`reconcile`](Self::reconcile).
    pub fn check(&mut self, outcome: &mut Outcome) -> bool {
        self.reconcile(outcome).can_continue()
    }

    fn all_errors_expected(&self, outcome: &Outcome) -> bool {
        self.expects_error()
            && self.server_error == outcome.server_error
            && self.client_error == outcome.client_error
    }

    fn lost_expected_error(&self, outcome: &Outcome) -> bool {
        (self.server_error != 0 && outcome.server_error == 0)
            || (self.client_error != 0 && outcome.client_error == 0)
    }
}

/// Text strictly between the first `{` and the first `}` after it.
fn directive_body(full_comment: &str) -> Option<&str> {
    let start = full_comment.find('{')? + 1;
    let len = full_comment[start..].find('}')?;
    Some(&full_comment[start..start + len])
}

/// Parse the `[+-]?digits` prefix of `word`, ignoring anything after it.
fn leading_int(word: &str) -> Option<i32> {
    let sign = usize::from(word.starts_with(['+', '-']));
    let digits = word[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(word.len(), |offset| sign + offset);
    if digits == sign {
        return None;
    }
    word[..digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_skips_parsing() {
        let hint = HintDirective::new(false, "SELECT 1 -- { serverError 60 }");
        assert!(!hint.is_enabled());
        assert_eq!((hint.server_error(), hint.client_error()), (0, 0));
    }

    #[test]
    fn test_parse_both_channels() {
        let hint = HintDirective::new(true, "SELECT 1 -- { serverError 60, clientError 20 }");
        assert_eq!((hint.server_error(), hint.client_error()), (60, 20));
    }

    #[test]
    fn test_parse_block_comment() {
        let hint = HintDirective::new(true, "SELECT /* {clientError 27} */ 1");
        assert_eq!(hint.client_error(), 27);

        let hint = HintDirective::new(true, "SELECT /* { clientError 27 } */ 1");
        assert_eq!(hint.client_error(), 27);
    }

    #[test]
    fn test_unknown_words_ignored() {
        let hint = HintDirective::new(true, "-- { echo serverError 5 timeout 10 }");
        assert_eq!(hint.server_error(), 5);
        assert_eq!(hint.client_error(), 0);
    }

    #[test]
    fn test_keywords_case_sensitive() {
        let hint = HintDirective::new(true, "-- { servererror 5 ClientError 6 }");
        assert!(!hint.expects_error());
    }

    #[test]
    fn test_malformed_value_keeps_previous() {
        let hint = HintDirective::new(true, "-- { serverError abc clientError 3 }");
        assert_eq!(hint.server_error(), 0);
        assert_eq!(hint.client_error(), 3);

        let hint = HintDirective::new(true, "-- { serverError 7 serverError x }");
        assert_eq!(hint.server_error(), 7);

        let hint = HintDirective::new(true, "-- { serverError 99999999999 }");
        assert_eq!(hint.server_error(), 0);

        let hint = HintDirective::new(true, "-- { serverError }");
        assert_eq!(hint.server_error(), 0);
    }

    #[test]
    fn test_missing_braces() {
        assert!(!HintDirective::new(true, "-- serverError 60").expects_error());
        assert!(!HintDirective::new(true, "-- { serverError 60").expects_error());
        assert!(!HintDirective::new(true, "-- } serverError 60 {").expects_error());
    }

    #[test]
    fn test_brace_pair_spans_comments() {
        let hint = HintDirective::new(true, "-- note {\nSELECT 1 -- serverError 60 }");
        assert_eq!(hint.server_error(), 60);
    }

    #[test]
    fn test_directive_body() {
        assert_eq!(directive_body("-- { a } { b }"), Some(" a "));
        assert_eq!(directive_body("{}"), Some(""));
        assert_eq!(directive_body("-- {"), None);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("60"), Some(60));
        assert_eq!(leading_int("60,"), Some(60));
        assert_eq!(leading_int("-5"), Some(-5));
        assert_eq!(leading_int("+5}"), Some(5));
        assert_eq!(leading_int("-"), None);
        assert_eq!(leading_int(",60"), None);
        assert_eq!(leading_int("2147483648"), None);
    }

    #[test]
    fn test_reconciliation_can_continue() {
        assert!(Reconciliation::Disabled.can_continue());
        assert!(Reconciliation::PassThrough.can_continue());
        assert!(!Reconciliation::Satisfied.can_continue());
        assert!(!Reconciliation::Violated.can_continue());
    }

    #[test]
    fn test_satisfied_resets_expectations() {
        let mut hint = HintDirective::new(true, "SELECT 1 -- { clientError 20 }");
        let mut outcome = Outcome::client_error(20, "Syntax error");
        assert_eq!(hint.reconcile(&mut outcome), Reconciliation::Satisfied);
        assert!(!hint.expects_error());
        assert_eq!(outcome.client_error, 20);
        assert_eq!(hint.reconcile(&mut outcome), Reconciliation::PassThrough);
    }

    #[test]
    fn test_keyword_names_round_trip() {
        for keyword in [DirectiveKeyword::ServerError, DirectiveKeyword::ClientError] {
            assert_eq!(DirectiveKeyword::from_word(keyword.as_ref()), Some(keyword));
        }
    }
}
