//! Splitting of multi-statement scripts.
//!
//! Test scripts put the hint after the statement terminator:
//!
//! ```sql
//! SELECT * FROM missing; -- { serverError 60 }
//! SELECT 1;
//! ```
//!
//! so a comment following `;` on the same line is kept with the statement that
//! the semicolon terminates.

use alloc::vec::Vec;

use crate::lexer::{Lexer, TokenType};

/// Split `script` into trimmed statements at top-level semicolons.
///
/// Semicolons inside literals and comments do not split. Segments holding
/// nothing but whitespace, comments and semicolons are dropped.
///
/// # Examples
///
/// ```
/// use sql_test_hint::script::split_statements;
///
/// let statements = split_statements("SELECT ';'; -- { serverError 60 }\nSELECT 2");
/// assert_eq!(statements, ["SELECT ';'; -- { serverError 60 }", "SELECT 2"]);
/// ```
#[must_use]
pub fn split_statements(script: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut lexer = Lexer::new(script);
    let mut start = 0;
    let mut has_code = false;

    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenType::EndOfStream => {
                if has_code {
                    statements.push(script[start..].trim());
                }
                break;
            }
            TokenType::Semicolon => {
                let end = absorb_trailing_comments(&mut lexer, token.span.end);
                if has_code {
                    statements.push(script[start..end].trim());
                }
                start = end;
                has_code = false;
            }
            TokenType::Whitespace | TokenType::Comment => {}
            _ => has_code = true,
        }
    }

    statements
}

/// Advance `lexer` over comments on the rest of the current line and return
/// the end of the last one (or `end` if there are none).
fn absorb_trailing_comments(lexer: &mut Lexer<'_>, mut end: usize) -> usize {
    let mut lookahead = lexer.clone();
    loop {
        let token = lookahead.next_token();
        match token.kind {
            TokenType::Whitespace if !token.text.contains('\n') => {}
            TokenType::Comment => {
                end = token.span.end;
                *lexer = lookahead.clone();
                // A line comment runs to the newline.
                if token.text.starts_with("--") {
                    return end;
                }
            }
            _ => return end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_statement_without_terminator() {
        assert_eq!(split_statements("  SELECT 1  "), ["SELECT 1"]);
    }

    #[test]
    fn test_trailing_hint_stays_with_statement() {
        let script = "SELECT 1; -- { serverError 60 }\n-- leading note\nSELECT 2;";
        assert_eq!(
            split_statements(script),
            [
                "SELECT 1; -- { serverError 60 }",
                "-- leading note\nSELECT 2;"
            ]
        );
    }

    #[test]
    fn test_block_comments_on_same_line() {
        let script = "SELECT 1; /* a */ /* b */ -- c\nSELECT 2";
        assert_eq!(
            split_statements(script),
            ["SELECT 1; /* a */ /* b */ -- c", "SELECT 2"]
        );
    }

    #[test]
    fn test_next_line_comment_belongs_to_next_statement() {
        let script = "SELECT 1;\n-- { clientError 20 }\nSELEC 2;";
        assert_eq!(
            split_statements(script),
            ["SELECT 1;", "-- { clientError 20 }\nSELEC 2;"]
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert!(split_statements("").is_empty());
        assert!(split_statements(" ;; -- only a comment\n/* x */").is_empty());
        assert_eq!(split_statements(";SELECT 1;;"), ["SELECT 1;"]);
    }

    #[test]
    fn test_semicolons_inside_literals() {
        let script = "INSERT INTO t VALUES ('a;b'); /* ; */ SELECT \"x;y\"";
        assert_eq!(
            split_statements(script),
            ["INSERT INTO t VALUES ('a;b'); /* ; */", "SELECT \"x;y\""]
        );
    }
}
