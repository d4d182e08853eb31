//! Extraction of comment text from a query.
//!
//! Comments are found with the [`Lexer`](crate::lexer::Lexer) rather than by
//! searching the raw text, so directive-like text inside string literals or
//! quoted identifiers is never picked up.

use alloc::string::String;

use crate::lexer::{Lexer, Token};

/// Concatenate the text of every comment in `query`, in order, separated by a
/// single space.
///
/// Comment markers are kept verbatim (`-- ...`, `/* ... */`). Returns an empty
/// string when the query has no comments. Never fails: malformed queries are
/// tokenized to the end.
///
/// # Examples
///
/// ```
/// use sql_test_hint::comments::extract;
///
/// let text = extract("SELECT '-- no' /* a */ FROM t -- b");
/// assert_eq!(text, "/* a */ -- b");
/// ```
#[must_use]
pub fn extract(query: &str) -> String {
    extract_from(Lexer::new(query))
}

/// Concatenate the comment tokens yielded by any token source.
///
/// Iteration stops at the first end-of-stream token, if the source yields one.
#[must_use]
pub fn extract_from<'input, I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token<'input>>,
{
    let mut full_comment = String::new();
    for token in tokens.into_iter().take_while(|token| !token.is_end()) {
        if token.is_comment() {
            if !full_comment.is_empty() {
                full_comment.push(' ');
            }
            full_comment.push_str(token.text);
        }
    }
    full_comment
}
