//! TCC has almost no recoverable error surface: a malformed scenario stream
//! is undefined behavior, so the loader panics with a descriptive message
//! rather than threading a `Result` through every token read.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read scenario input: {0}")]
    Io(#[from] std::io::Error),
}
