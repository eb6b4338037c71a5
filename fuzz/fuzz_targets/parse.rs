#![no_main]

use apptest_syntax::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the lexer
        if let Ok(tokens) = lexer::lex(s) {
            // If lexing succeeds, the parser must return, never panic
            if let Err(e) = parser::parse(&tokens) {
                // Rendering must handle any span the parser produces
                let _ = e.render("fuzz_test.rt", s);
            }
        }
    }
});
