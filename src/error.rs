// Copyright (c) 2024 Mike Tsao

//! Error types shared across the crate.

use thiserror::Error;

/// Problems found while reading a layout or script line. These are never
/// fatal: the offending line is skipped and the rest of the input is used.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    /// The first word of the line isn't a known command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// A `key = value` assignment named a key we don't recognize.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    /// A required `KEY=value` field or positional argument is absent.
    #[error("{command} requires {field}")]
    MissingField {
        #[allow(missing_docs)]
        command: String,
        #[allow(missing_docs)]
        field: String,
    },
    /// A value didn't parse as a number.
    #[error("`{value}` is not a valid number for {field}")]
    InvalidNumber {
        #[allow(missing_docs)]
        field: String,
        #[allow(missing_docs)]
        value: String,
    },
    /// A coordinate pair wasn't of the form `x,y`.
    #[error("`{0}` is not a valid x,y coordinate pair")]
    InvalidCoordinates(String),
    /// A path needs at least two control points.
    #[error("{command} requires at least 2 points, found {found}")]
    TooFewPoints {
        #[allow(missing_docs)]
        command: String,
        #[allow(missing_docs)]
        found: usize,
    },
    /// A method name didn't match any known spatialization method.
    #[error("unknown spatialization method `{0}`")]
    UnknownMethod(String),
}

/// A [ParseError] along with where it happened.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number within the input.
    pub line_number: usize,
    /// The offending line, trimmed.
    pub line: String,
    #[allow(missing_docs)]
    pub error: ParseError,
}
impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.error, self.line)
    }
}

/// Failures reported by an output sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink has no open stream to write to.
    #[error("the output stream is not running")]
    NotRunning,
    /// The buffer's channel count exceeds what the sink was opened with.
    #[error("buffer has {buffer} channels but the sink accepts {sink}")]
    ChannelMismatch {
        #[allow(missing_docs)]
        buffer: usize,
        #[allow(missing_docs)]
        sink: usize,
    },
    /// The underlying device reported a failure. The stream has been torn
    /// down; callers may reopen it.
    #[error("output device failed: {0}")]
    Device(String),
}

/// Failures that stop a script run early.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Writing to the sink failed. Audio that an offline sink already
    /// accumulated remains valid.
    #[error("sink write failed while executing action {action_index}: {source}")]
    Sink {
        #[allow(missing_docs)]
        action_index: usize,
        #[allow(missing_docs)]
        source: SinkError,
    },
    /// The writer thread panicked.
    #[error("audio writer thread panicked")]
    WriterPanicked,
}
