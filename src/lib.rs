#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;
#[cfg(feature = "testing")]
extern crate std;

pub mod comments;
pub mod errors;
pub mod hint;
pub mod lexer;
pub mod outcome;
pub mod script;
pub mod session;
#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types
pub use hint::{DirectiveKeyword, HintDirective, Reconciliation};
pub use lexer::{Lexer, Token, TokenType};
pub use outcome::Outcome;
pub use session::{QueryExecutor, QueryReport, Session, SessionConfig, SessionStats};

// Re-export errors
pub use errors::{Error, LOGICAL_ERROR};
