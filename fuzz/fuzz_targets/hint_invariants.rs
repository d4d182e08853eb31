//! Hint invariant fuzzer.
//!
//! Feeds arbitrary queries and outcomes through lexing, hint construction and
//! reconciliation, checking that lexing tiles the input and that every verdict
//! agrees with the parsed expectations.

use honggfuzz::fuzz;
use sql_test_hint::testing::{HintFuzzInput, test_hint_invariants};

fn main() {
    loop {
        fuzz!(|input: HintFuzzInput| {
            test_hint_invariants(&input);
        });
    }
}
