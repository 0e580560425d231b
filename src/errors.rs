//! Typed errors for the storage core and the REPL layer around it.
use std::fmt;

/// Every failure mode the crate can produce.
///
/// Variants are grouped by how the REPL is expected to react: the
/// parse/exec family is recoverable (print the message, keep the loop
/// running); `Io` and `Storage` are fatal (print the message, abort).
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Invariant violation or unimplemented path: corrupt file length,
    /// out-of-bounds page fetch, flush of an empty frame, splitting a
    /// non-root leaf, a child index exceeding num_keys. Always fatal.
    Storage(String),
    DuplicateKey,
    TableFull,
    NegativeId,
    StringTooLong,
    Syntax(String),
    UnrecognizedStatement(String),
    UnrecognizedCommand(String),
}

impl Error {
    /// `true` if the REPL should print this error and keep running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DuplicateKey
                | Error::TableFull
                | Error::NegativeId
                | Error::StringTooLong
                | Error::Syntax(_)
                | Error::UnrecognizedStatement(_)
                | Error::UnrecognizedCommand(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::Storage(msg) => write!(f, "{msg}"),
            Error::DuplicateKey => write!(f, "error: duplicate key."),
            Error::TableFull => write!(f, "error: table full."),
            Error::NegativeId => write!(f, "id must be positive."),
            Error::StringTooLong => write!(f, "string is too long."),
            Error::Syntax(_) => write!(f, "syntax error. could not parse statement."),
            Error::UnrecognizedStatement(line) => {
                write!(f, "unrecognized keyword at start of '{line}'.")
            }
            Error::UnrecognizedCommand(line) => write!(f, "unrecognized command '{line}'."),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
