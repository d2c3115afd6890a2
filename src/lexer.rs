//! Splitting of an input line into whitespace-delimited words.

/// Characters that separate words on the command line.
pub const WHITESPACE: &str = " \t\r\n";

/// Splits `line` into tokens on any run of characters from `delimiters`.
///
/// Empty fields between consecutive delimiters are discarded, so a line made
/// only of delimiters yields an empty vector. The returned tokens are owned
/// copies; nothing borrows from `line` after the call.
pub fn tokenize(line: &str, delimiters: &str) -> Vec<String> {
    line.split(|c: char| delimiters.contains(c))
        .filter(|field| !field.is_empty())
        .map(String::from)
        .collect()
}
