//! Command Line Tokenizer
//!
//! Splits one command line into tokens. Spaces separate tokens, and a
//! double-quoted segment keeps its spaces:
//!
//! ```text
//! SET greeting "hello world"   ->   ["SET", "greeting", "hello world"]
//! ```
//!
//! Quote characters are never part of a token. An unmatched quote is not an
//! error; everything after it is read as if quoted.

/// Splits a command line into tokens.
///
/// # Example
///
/// ```
/// use datastacks::protocol::tokenize;
///
/// assert_eq!(tokenize(r#"GET key "abc 123""#), vec!["GET", "key", "abc 123"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
