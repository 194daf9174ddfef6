//! The parsed-input tree produced by [`crate::shell::parser`].
//!
//! One [`ParsedInput`] is built fresh for each REPL iteration and dropped
//! before the next prompt — it owns no resources beyond `String`/`Vec`.

/// A single external command: program name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
}

/// The separator chosen at one nesting level. A `ParsedInput` picks exactly
/// one: mixing `|`, `;`, and `&` within the same level is a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// A single child, no separator present.
    None,
    /// `a | b | c`
    Pipe,
    /// `a ; b ; c`
    Seq,
    /// `a & b & c`
    Para,
}

/// One element of a [`ParsedInput`] sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleInput {
    Command(Command),
    /// A `|`-chain nested *inside* a `;`/`&` item (e.g. the `a | b` in
    /// `a | b ; c`) — never produced directly under a `Pipe` separator,
    /// whose stages are `Command`/`Subshell` instead.
    Pipeline(Vec<Command>),
    /// The raw text between `(` and `)`, re-parsed recursively on demand.
    Subshell(String),
}

/// The tree produced by parsing one line (or one subshell body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub separator: Separator,
    pub inputs: Vec<SingleInput>,
}

impl ParsedInput {
    /// A `ParsedInput` with exactly one child and no separator.
    pub fn single(input: SingleInput) -> Self {
        ParsedInput {
            separator: Separator::None,
            inputs: vec![input],
        }
    }
}
