//! SQL lexer that classifies every byte of a query into tokens.
//!
//! Unlike a parser-facing lexer, this one never fails and never skips input:
//! whitespace and comments are tokens too, and the spans of consecutive tokens
//! tile the whole input. Unterminated comments and literals extend to the end
//! of the input, and unknown characters become [`TokenType::Error`] tokens.

use core::ops::Range;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'input> {
    /// The kind of token.
    pub kind: TokenType,
    /// Byte range of the token in the input.
    pub span: Range<usize>,
    /// The source text of the token, delimiters included.
    pub text: &'input str,
}

impl Token<'_> {
    /// Returns whether this is the end-of-input sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenType::EndOfStream
    }

    /// Returns whether this token is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == TokenType::Comment
    }

    /// Length of the token in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.span.len()
    }
}

/// The different kinds of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Run of whitespace characters.
    Whitespace,
    /// `-- line` or `/* block */` comment, markers included.
    Comment,
    /// Unquoted word: keyword, identifier or function name.
    BareWord,
    /// Numeric literal.
    Number,
    /// Single-quoted string literal.
    StringLiteral,
    /// Double-quoted or backtick-quoted identifier.
    QuotedIdentifier,
    /// Single punctuation or operator character.
    Punctuation,
    /// Statement separator.
    Semicolon,
    /// Character the lexer does not recognize.
    Error,
    /// End of input.
    EndOfStream,
}

impl AsRef<str> for TokenType {
    fn as_ref(&self) -> &str {
        match self {
            TokenType::Whitespace => "<whitespace>",
            TokenType::Comment => "<comment>",
            TokenType::BareWord => "<word>",
            TokenType::Number => "<number>",
            TokenType::StringLiteral => "<string>",
            TokenType::QuotedIdentifier => "<quoted identifier>",
            TokenType::Punctuation => "<punctuation>",
            TokenType::Semicolon => ";",
            TokenType::Error => "<error>",
            TokenType::EndOfStream => "<eof>",
        }
    }
}

/// SQL lexer that produces tokens from a borrowed query.
#[derive(Debug, Clone)]
pub struct Lexer<'input> {
    input: &'input str,
    pos: usize,
}

impl<'input> Lexer<'input> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'input str) -> Self {
        Self { input, pos: 0 }
    }

    /// Get the current position in the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume and return the next token.
    ///
    /// Once the input is exhausted every call returns
    /// [`TokenType::EndOfStream`] with an empty span at the end of the input.
    pub fn next_token(&mut self) -> Token<'input> {
        let start = self.pos;
        let input = self.input;
        let bytes = input.as_bytes();

        let Some(&b) = bytes.get(self.pos) else {
            return self.token(TokenType::EndOfStream, start);
        };
        let next = bytes.get(self.pos + 1).copied();

        let kind = match b {
            _ if b.is_ascii_whitespace() => {
                self.advance_while(|b| b.is_ascii_whitespace());
                TokenType::Whitespace
            }
            b'-' if next == Some(b'-') => {
                self.advance_while(|b| b != b'\n');
                TokenType::Comment
            }
            b'/' if next == Some(b'*') => {
                self.read_block_comment();
                TokenType::Comment
            }
            b'\'' => {
                self.read_quoted(b);
                TokenType::StringLiteral
            }
            b'"' | b'`' => {
                self.read_quoted(b);
                TokenType::QuotedIdentifier
            }
            b';' => {
                self.pos += 1;
                TokenType::Semicolon
            }
            _ if b.is_ascii_digit() => {
                self.read_number();
                TokenType::Number
            }
            _ if is_word_start(b) => {
                self.advance_while(is_word_cont);
                TokenType::BareWord
            }
            _ if is_punctuation(b) => {
                self.pos += 1;
                TokenType::Punctuation
            }
            _ => {
                // Step over one full character so spans stay on char boundaries.
                let width = input[self.pos..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.pos += width;
                TokenType::Error
            }
        };

        self.token(kind, start)
    }

    fn token(&self, kind: TokenType, start: usize) -> Token<'input> {
        Token {
            kind,
            span: start..self.pos,
            text: &self.input[start..self.pos],
        }
    }

    fn advance_while(&mut self, predicate: impl Fn(u8) -> bool) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && predicate(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn read_block_comment(&mut self) {
        let bytes = self.input.as_bytes();
        self.pos += 2; // Skip /*
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'*' && bytes.get(self.pos + 1) == Some(&b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn read_quoted(&mut self, quote: u8) {
        let bytes = self.input.as_bytes();
        self.pos += 1; // Skip opening quote
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == b'\\' {
                // The escaped byte is skipped; a multi-byte character is then
                // walked over by its continuation bytes, which are never quotes.
                self.pos = (self.pos + 2).min(bytes.len());
            } else if b == quote {
                // Check for escaped quote (doubled)
                if bytes.get(self.pos + 1) == Some(&quote) {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                    return;
                }
            } else {
                self.pos += 1;
            }
        }
    }

    fn read_number(&mut self) {
        let input = self.input;
        let bytes = input.as_bytes();
        self.advance_while(|b| b.is_ascii_digit());

        if bytes.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            self.advance_while(|b| b.is_ascii_digit());
        }

        if matches!(bytes.get(self.pos), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(self.pos + 1), Some(b'+' | b'-')));
            if bytes
                .get(self.pos + 1 + sign)
                .is_some_and(u8::is_ascii_digit)
            {
                self.pos += 1 + sign;
                self.advance_while(|b| b.is_ascii_digit());
            }
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Token<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (!token.is_end()).then_some(token)
    }
}

/// Check if a byte can start a bare word.
fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii()
}

/// Check if a byte can continue a bare word.
fn is_word_cont(b: u8) -> bool {
    is_word_start(b) || b.is_ascii_digit() || b == b'$'
}

/// Check if a byte is a single-character punctuation token.
fn is_punctuation(b: u8) -> bool {
    b"()[]{},.+-*/%=<>!?:@|^&~#$".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn kinds(input: &str) -> Vec<TokenType> {
        Lexer::new(input).map(|token| token.kind).collect()
    }

    #[test]
    fn test_line_comment_stops_at_newline() {
        let tokens: Vec<_> = Lexer::new("SELECT 1 -- { serverError 60 }\nFROM t").collect();
        let comment = tokens.iter().find(|t| t.is_comment()).unwrap();
        assert_eq!(comment.text, "-- { serverError 60 }");
        assert_eq!(tokens.last().unwrap().text, "t");
    }

    #[test]
    fn test_block_comment() {
        assert_eq!(kinds("/* a */x"), [TokenType::Comment, TokenType::BareWord]);
        let mut lexer = Lexer::new("/* a /* b */ c */");
        assert_eq!(lexer.next_token().text, "/* a /* b */");
    }

    #[test]
    fn test_unterminated_tokens_run_to_end() {
        let tokens: Vec<_> = Lexer::new("SELECT /* open").collect();
        assert_eq!(tokens.last().unwrap().text, "/* open");

        let tokens: Vec<_> = Lexer::new("SELECT 'it''s -- not a comment").collect();
        assert_eq!(tokens.last().unwrap().kind, TokenType::StringLiteral);
        assert!(tokens.iter().all(|t| !t.is_comment()));
    }

    #[test]
    fn test_string_escapes() {
        let tokens: Vec<_> = Lexer::new(r"'a\'b' `c``d` x").collect();
        assert_eq!(tokens[0].text, r"'a\'b'");
        assert_eq!(tokens[2].text, "`c``d`");
        assert_eq!(tokens[2].kind, TokenType::QuotedIdentifier);
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<_> = Lexer::new("42 3.14 1e10 2e").collect();
        let numbers: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenType::Number)
            .map(|t| t.text)
            .collect();
        assert_eq!(numbers, ["42", "3.14", "1e10", "2"]);
    }

    #[test]
    fn test_symbols_and_errors() {
        assert_eq!(
            kinds("(a);\\"),
            [
                TokenType::Punctuation,
                TokenType::BareWord,
                TokenType::Punctuation,
                TokenType::Semicolon,
                TokenType::Error,
            ]
        );
    }

    #[test]
    fn test_spans_tile_input() {
        let input = "SELECT 'é', \"ü\" /* ☃ */ -- ok\n§;";
        let mut expected_start = 0;
        for token in Lexer::new(input) {
            assert_eq!(token.span.start, expected_start);
            assert_eq!(&input[token.span.clone()], token.text);
            expected_start = token.span.end;
        }
        assert_eq!(expected_start, input.len());
    }

    #[test]
    fn test_end_of_stream_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenType::BareWord);
        assert!(lexer.next_token().is_end());
        let end = lexer.next_token();
        assert!(end.is_end());
        assert_eq!(end.span, 1..1);
        assert_eq!(lexer.position(), 1);
    }
}
