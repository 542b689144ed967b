#![forbid(unsafe_code)]

//! Error types for the move log.
//!
//! - [`ReadError`]: a persisted log could not be parsed. Recoverable; the
//!   log is left empty.
//! - [`SanityError`]: the chain violates a structural invariant. This is a
//!   bug in the log itself, never bad input.
//! - [`ConfigError`]: a [`MoveLogConfig`](crate::MoveLogConfig) could not be
//!   loaded or failed validation.
//!
//! Nothing-to-do outcomes (empty undo, mark not found) are `None`, not errors.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Failure while reading a persisted log.
///
/// Offsets are byte offsets into the stream, pointing at the offending byte.
#[derive(Debug)]
pub enum ReadError {
    /// The underlying reader failed.
    Io(io::Error),
    /// The stream ended before the `.` terminator.
    UnexpectedEof { offset: u64 },
    /// A token started with a character that begins no known token.
    UnexpectedChar { found: char, offset: u64 },
    /// A move field was not followed by `,`.
    ExpectedSeparator { found: Option<char>, offset: u64 },
    /// A numeric field was empty, malformed or out of range.
    InvalidNumber { offset: u64 },
    /// A direction other than `1` or `-1`.
    InvalidDirection { value: i32, offset: u64 },
    /// A mark character that is not valid UTF-8.
    InvalidMark { offset: u64 },
}

impl ReadError {
    /// Byte offset of the failure, if it is a parse error.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Io(_) => None,
            Self::UnexpectedEof { offset }
            | Self::UnexpectedChar { offset, .. }
            | Self::ExpectedSeparator { offset, .. }
            | Self::InvalidNumber { offset }
            | Self::InvalidDirection { offset, .. }
            | Self::InvalidMark { offset } => Some(*offset),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof { offset } => {
                write!(f, "log ended without terminator at byte {offset}")
            }
            Self::UnexpectedChar { found, offset } => {
                write!(f, "unexpected character {found:?} at byte {offset}")
            }
            Self::ExpectedSeparator {
                found: Some(found),
                offset,
            } => write!(f, "expected ',' but found {found:?} at byte {offset}"),
            Self::ExpectedSeparator {
                found: None,
                offset,
            } => write!(f, "expected ',' but found end of log at byte {offset}"),
            Self::InvalidNumber { offset } => write!(f, "invalid number at byte {offset}"),
            Self::InvalidDirection { value, offset } => {
                write!(f, "invalid direction {value} at byte {offset}")
            }
            Self::InvalidMark { offset } => write!(f, "invalid mark character at byte {offset}"),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// A structural invariant of the chain does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanityError {
    /// Exactly one of `first` and `last` is set.
    EndsMismatch,
    /// `first` has a predecessor.
    FirstHasPrev,
    /// `last` has a successor.
    LastHasNext,
    /// A node's successor does not point back at it.
    BrokenForwardLink { position: usize },
    /// The chain ends somewhere other than `last`.
    LastNotReached { position: usize },
    /// A link points at a freed slot.
    DanglingLink { position: usize },
    /// The walk from `first` visits more nodes than the chain holds.
    Cycle,
    /// The walk from `first` visits fewer nodes than the chain holds.
    LengthMismatch { expected: usize, walked: usize },
    /// The cursor rests on a mark instead of a move.
    CursorOnMark { position: usize },
    /// The cursor is set but not part of the chain.
    CursorUnreachable,
}

impl fmt::Display for SanityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndsMismatch => write!(f, "first and last disagree about emptiness"),
            Self::FirstHasPrev => write!(f, "first node has a predecessor"),
            Self::LastHasNext => write!(f, "last node has a successor"),
            Self::BrokenForwardLink { position } => {
                write!(f, "node {position} is not the predecessor of its successor")
            }
            Self::LastNotReached { position } => {
                write!(f, "chain ends at node {position}, which is not last")
            }
            Self::DanglingLink { position } => {
                write!(f, "node {position} links to a freed slot")
            }
            Self::Cycle => write!(f, "chain contains a cycle"),
            Self::LengthMismatch { expected, walked } => {
                write!(f, "chain holds {expected} nodes but {walked} are linked")
            }
            Self::CursorOnMark { position } => {
                write!(f, "cursor rests on mark at node {position}")
            }
            Self::CursorUnreachable => write!(f, "cursor is not part of the chain"),
        }
    }
}

impl std::error::Error for SanityError {}

/// Failure while loading a [`MoveLogConfig`](crate::MoveLogConfig).
///
/// Every variant records where the config came from: a file path, or `None`
/// for text passed in directly.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The text is not TOML, or a field has the wrong type.
    #[cfg(feature = "config")]
    Toml {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    /// The text is not JSON, or a field has the wrong type.
    #[cfg(feature = "config")]
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    /// The config parsed but [`validate`](crate::MoveLogConfig::validate)
    /// rejected it.
    Validation {
        path: Option<PathBuf>,
        errors: Vec<String>,
    },
}

impl ConfigError {
    /// The file the config was loaded from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } => Some(path.as_path()),
            #[cfg(feature = "config")]
            Self::Toml { path, .. } | Self::Json { path, .. } => path.as_deref(),
            Self::Validation { path, .. } => path.as_deref(),
        }
    }
}

/// Renders a config origin for messages.
struct Origin<'a>(Option<&'a Path>);

impl fmt::Display for Origin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str("inline text"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = Origin(self.path());
        match self {
            Self::Io { source, .. } => {
                write!(f, "cannot read move log config {origin}: {source}")
            }
            #[cfg(feature = "config")]
            Self::Toml { source, .. } => {
                write!(f, "move log config ({origin}) is not valid TOML: {source}")
            }
            #[cfg(feature = "config")]
            Self::Json { source, .. } => {
                write!(f, "move log config ({origin}) is not valid JSON: {source}")
            }
            Self::Validation { errors, .. } => {
                write!(f, "move log config ({origin}) rejected: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            #[cfg(feature = "config")]
            Self::Toml { source, .. } => Some(source),
            #[cfg(feature = "config")]
            Self::Json { source, .. } => Some(source),
            Self::Validation { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn read_error_display_names_offset() {
        let err = ReadError::UnexpectedChar {
            found: 'x',
            offset: 7,
        };
        assert_eq!(err.to_string(), "unexpected character 'x' at byte 7");
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn separator_error_mentions_end_of_log() {
        let err = ReadError::ExpectedSeparator {
            found: None,
            offset: 3,
        };
        assert!(err.to_string().contains("end of log"));
    }

    #[test]
    fn io_error_is_the_source() {
        let err = ReadError::from(io::Error::other("disk gone"));
        assert!(err.source().is_some());
        assert_eq!(err.offset(), None);
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn sanity_error_display() {
        let err = SanityError::LengthMismatch {
            expected: 3,
            walked: 2,
        };
        assert_eq!(err.to_string(), "chain holds 3 nodes but 2 are linked");
    }

    #[test]
    fn config_validation_error_joins_messages() {
        let err = ConfigError::Validation {
            path: None,
            errors: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "move log config (inline text) rejected: a; b");
        assert!(err.source().is_none());
        assert!(err.path().is_none());
    }

    #[test]
    fn config_io_error_names_the_file() {
        let err = ConfigError::Io {
            path: PathBuf::from("conf/movelog.toml"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(
            err.to_string()
                .starts_with("cannot read move log config conf/movelog.toml: ")
        );
        assert_eq!(err.path(), Some(Path::new("conf/movelog.toml")));
        assert!(err.source().is_some());
    }
}
