// src/core/arg_parser.rs

//! Low-level helpers for slicing a raw command line.
//!
//! Nothing here knows about builtins or processes. The functions only trim,
//! split, and locate operators while honoring single-quote pairs.

use crate::constants::WHITESPACE;

/// Trims the shell's whitespace set from both ends.
pub fn trim(line: &str) -> &str {
    line.trim_matches(WHITESPACE)
}

/// Splits a line into whitespace-separated words. Quotes are not interpreted.
pub fn split_words(line: &str) -> Vec<String> {
    line.split(WHITESPACE)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Byte offset of the first `pattern` that is not inside a single-quote pair.
pub fn find_outside_quotes(line: &str, pattern: &str) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }
    let mut in_quotes = false;
    for (index, ch) in line.char_indices() {
        if ch == '\'' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && line.get(index..).is_some_and(|rest| rest.starts_with(pattern)) {
            return Some(index);
        }
    }
    None
}

/// Whether the line ends with the background marker, ignoring trailing whitespace.
pub fn is_background(line: &str) -> bool {
    line.trim_end_matches(WHITESPACE).ends_with('&')
}

/// Removes one trailing background marker and the whitespace around it.
pub fn strip_background(line: &str) -> &str {
    let trimmed = line.trim_end_matches(WHITESPACE);
    match trimmed.strip_suffix('&') {
        Some(rest) => rest.trim_end_matches(WHITESPACE),
        None => trimmed,
    }
}

/// Tokenizes a command line the way a POSIX shell would for `argv`.
/// Returns `None` on unbalanced quotes.
pub fn tokenize(line: &str) -> Option<Vec<String>> {
    shlex::split(line)
}

/// Whether the line contains a `*` or `?` that is not escaped with a backslash.
pub fn has_wildcards(line: &str) -> bool {
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// Result of reading a job-id argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobIdArg {
    /// A non-negative integer. Zero never names a live job.
    Id(usize),
    /// A negative number or anything that is not an integer.
    Invalid,
}

pub fn parse_job_id(token: &str) -> JobIdArg {
    match token.parse::<i64>() {
        Ok(value) => usize::try_from(value).map_or(JobIdArg::Invalid, JobIdArg::Id),
        Err(_) => JobIdArg::Invalid,
    }
}

/// Reads a `-<int>` signal token. The sign is required and the number must fit an `i32`.
pub fn parse_signal_token(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_split() {
        assert_eq!(trim("  \tls -la \n"), "ls -la");
        assert_eq!(split_words("  ls   -la\t/tmp "), vec!["ls", "-la", "/tmp"]);
        assert!(split_words("   ").is_empty());
    }

    #[test]
    fn test_find_outside_quotes_skips_quoted_operators() {
        assert_eq!(find_outside_quotes("echo 'a>b'", ">"), None);
        assert_eq!(find_outside_quotes("echo 'a>b' > out", ">"), Some(11));
        assert_eq!(find_outside_quotes("a | b", "|"), Some(2));
        assert_eq!(find_outside_quotes("echo 'x|y'", "|"), None);
        assert_eq!(find_outside_quotes("ls >> f", ">>"), Some(3));
    }

    #[test]
    fn test_background_marker() {
        assert!(is_background("sleep 10&"));
        assert!(is_background("sleep 10 &   "));
        assert!(!is_background("sleep 10"));
        assert_eq!(strip_background("sleep 10 &  "), "sleep 10");
        assert_eq!(strip_background("sleep 10&"), "sleep 10");
        assert_eq!(strip_background("sleep 10"), "sleep 10");
    }

    #[test]
    fn test_tokenize_handles_quotes() {
        assert_eq!(
            tokenize("echo 'a b' c").unwrap(),
            vec!["echo".to_string(), "a b".to_string(), "c".to_string()]
        );
        assert!(tokenize("echo 'unterminated").is_none());
    }

    #[test]
    fn test_wildcards() {
        assert!(has_wildcards("ls *.txt"));
        assert!(has_wildcards("ls file?.rs"));
        assert!(!has_wildcards("ls \\*.txt"));
        assert!(!has_wildcards("ls -la"));
    }

    #[test]
    fn test_parse_job_id() {
        assert_eq!(parse_job_id("3"), JobIdArg::Id(3));
        assert_eq!(parse_job_id("0"), JobIdArg::Id(0));
        assert_eq!(parse_job_id("-2"), JobIdArg::Invalid);
        assert_eq!(parse_job_id("abc"), JobIdArg::Invalid);
    }

    #[test]
    fn test_parse_signal_token() {
        assert_eq!(parse_signal_token("-9"), Some(9));
        assert_eq!(parse_signal_token("-19"), Some(19));
        assert_eq!(parse_signal_token("9"), None);
        assert_eq!(parse_signal_token("-"), None);
        assert_eq!(parse_signal_token("--9"), None);
        assert_eq!(parse_signal_token("-x"), None);
    }
}
