//! The shell's error taxonomy: spawn failures and parse failures are
//! reported and swallowed at their call site; only an I/O failure reading
//! the next line propagates out of the REPL loop.

use crate::shell::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to start process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("error reading input: {0}")]
    Io(#[source] std::io::Error),
}
