//! Trace input for cache simulation
//!
//! Two plain-text formats are understood:
//!
//! - **classic**: `capacity count k1 k2 ... kcount`, whitespace separated and
//!   free to span any number of lines. This is the format the `generate`
//!   subcommand writes.
//! - **lines**: one key per line; blank lines and `#` comments are skipped.
//!   There is no header, so the capacity must come from the command line.
//!
//! Keys are signed integers in both formats.

use crate::models::Trace;
use clap::ValueEnum;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key type used throughout the simulator.
pub type Key = i64;

/// Supported trace layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceFormat {
    /// `capacity count k1 ... kcount`
    Classic,
    /// One key per line, no header
    Lines,
}

/// Errors raised while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read trace from stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("trace header is missing its {0}")]
    MissingHeader(&'static str),

    #[error("line {line}, column {column}: expected an integer, found `{token}`")]
    InvalidToken {
        line: usize,
        column: usize,
        token: String,
    },

    #[error("header declares {declared} keys but only {found} follow")]
    CountMismatch { declared: usize, found: usize },
}

/// A whitespace-delimited token and where it started (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    line: usize,
    column: usize,
}

fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    text.lines().enumerate().flat_map(|(idx, line)| {
        let base = line.as_ptr() as usize;
        line.split_whitespace().map(move |word| Token {
            text: word,
            line: idx + 1,
            column: word.as_ptr() as usize - base + 1,
        })
    })
}

fn parse_token<T: std::str::FromStr>(token: Token<'_>) -> Result<T, TraceError> {
    token.text.parse().map_err(|_| TraceError::InvalidToken {
        line: token.line,
        column: token.column,
        token: token.text.to_string(),
    })
}

/// Parses a classic-format trace.
pub fn parse_classic(text: &str) -> Result<Trace, TraceError> {
    let mut tokens = tokens(text);

    let capacity = parse_token(tokens.next().ok_or(TraceError::MissingHeader("capacity"))?)?;
    let declared: usize = parse_token(tokens.next().ok_or(TraceError::MissingHeader("key count"))?)?;

    let mut keys = Vec::with_capacity(declared.min(1 << 24));
    for token in tokens.by_ref().take(declared) {
        keys.push(parse_token::<Key>(token)?);
    }
    if keys.len() < declared {
        return Err(TraceError::CountMismatch {
            declared,
            found: keys.len(),
        });
    }

    let trailing = tokens.count();
    if trailing > 0 {
        tracing::warn!(trailing, "ignoring tokens after the declared keys");
    }

    Ok(Trace {
        capacity: Some(capacity),
        keys,
    })
}

/// Parses a lines-format trace.
pub fn parse_lines(text: &str) -> Result<Trace, TraceError> {
    let mut keys = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let column = raw.len() - raw.trim_start().len() + 1;
        keys.push(parse_token(Token {
            text: line,
            line: idx + 1,
            column,
        })?);
    }
    Ok(Trace {
        capacity: None,
        keys,
    })
}

/// Reads a trace from `path`, or from stdin when `path` is `None`.
pub fn read_trace(path: Option<&Path>, format: TraceFormat) -> Result<Trace, TraceError> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(TraceError::Stdin)?;
            buf
        }
    };

    let trace = match format {
        TraceFormat::Classic => parse_classic(&text)?,
        TraceFormat::Lines => parse_lines(&text)?,
    };
    tracing::debug!(
        keys = trace.keys.len(),
        capacity = ?trace.capacity,
        "trace loaded"
    );
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classic_single_line() {
        let trace = parse_classic("2 6 1 1 1 2 2 3").unwrap();
        assert_eq!(trace.capacity, Some(2));
        assert_eq!(trace.keys, vec![1, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_parse_classic_spans_lines() {
        let trace = parse_classic("3\n4\n10 -20\n  30\n40\n").unwrap();
        assert_eq!(trace.capacity, Some(3));
        assert_eq!(trace.keys, vec![10, -20, 30, 40]);
    }

    #[test]
    fn test_parse_classic_short_trace() {
        let err = parse_classic("2 5 1 2 3").unwrap_err();
        assert!(matches!(
            err,
            TraceError::CountMismatch {
                declared: 5,
                found: 3
            }
        ));
    }

    #[test]
    fn test_parse_classic_ignores_trailing_tokens() {
        let trace = parse_classic("1 2 7 8 9").unwrap();
        assert_eq!(trace.keys, vec![7, 8]);
    }

    #[test]
    fn test_parse_classic_reports_position() {
        let err = parse_classic("2 3\n1  x 3").unwrap_err();
        match err {
            TraceError::InvalidToken {
                line,
                column,
                token,
            } => {
                assert_eq!((line, column), (2, 4));
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_parse_classic_missing_header() {
        assert!(matches!(
            parse_classic("   \n"),
            Err(TraceError::MissingHeader("capacity"))
        ));
        assert!(matches!(
            parse_classic("4"),
            Err(TraceError::MissingHeader("key count"))
        ));
        assert!(matches!(
            parse_classic("-1 2 1 1"),
            Err(TraceError::InvalidToken { line: 1, column: 1, .. })
        ));
    }

    #[test]
    fn test_parse_lines_skips_comments() {
        let trace = parse_lines("# warm-up\n5\n\n 6\n# tail\n5\n").unwrap();
        assert_eq!(trace.capacity, None);
        assert_eq!(trace.keys, vec![5, 6, 5]);
    }

    #[test]
    fn test_parse_lines_rejects_garbage() {
        let err = parse_lines("1\n2\n  three\n").unwrap_err();
        assert!(matches!(
            err,
            TraceError::InvalidToken {
                line: 3,
                column: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_read_trace_missing_file() {
        let err = read_trace(
            Some(Path::new("/nonexistent/trace.txt")),
            TraceFormat::Classic,
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trace.txt"));
    }
}
