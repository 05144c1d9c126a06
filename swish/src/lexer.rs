//! Lexer for swish command lines
//!
//! Splits a line on spaces and tabs. There is no quoting: operators such as
//! `<`, `>`, `>>` and `&` are only recognized later, when they stand alone as
//! a whole token.

use crate::error::{ShellError, ShellResult};
use chumsky::prelude::*;

pub fn lexer() -> impl Parser<char, Vec<String>, Error = Simple<char>> {
    let ws = filter(|c: &char| is_separator(*c)).repeated();

    // NUL can never reach an argument vector
    let word = filter(|c: &char| !is_separator(*c) && *c != '\0')
        .repeated()
        .at_least(1)
        .collect::<String>();

    ws.clone()
        .ignore_then(word.then_ignore(ws).repeated())
        .then_ignore(end())
}

/// Only spaces and tabs split words; any other character, including other
/// Unicode whitespace, belongs to the word it appears in.
fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Tokenize one input line.
pub fn tokenize(input: &str) -> ShellResult<Vec<String>> {
    lexer().parse(input.trim_end_matches(['\n', '\r'])).map_err(|errs| {
        let msg = errs
            .into_iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        ShellError::Parse(msg)
    })
}
