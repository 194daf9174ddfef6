//! The REPL loop: prompt, read a line, parse, dispatch.

use std::io::{self, Write};

use tracing::debug;

use crate::shell::error::Error;
use crate::shell::executor;
use crate::shell::parser;

const PROMPT: &str = "/> ";

/// Run the REPL until `quit`, EOF, or a read error. The prompt string, the
/// EOF message, and the silent `quit` exit are externally observable
/// behavior, not incidental formatting.
pub fn run() -> Result<(), Error> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        stdout.flush().map_err(Error::Io)?;

        let mut line = String::new();
        let read = stdin.read_line(&mut line).map_err(Error::Io)?;

        if read == 0 {
            println!("\nEOF detected. Exiting eshell.");
            return Ok(());
        }

        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "quit" {
            return Ok(());
        }

        match parser::parse(trimmed) {
            Ok(parsed) => executor::dispatch(&parsed),
            Err(e) => {
                // Parse failures reprompt silently; logged at debug only,
                // never surfaced to the user.
                debug!(error = %e, line = trimmed, "parse failed, reprompting");
            }
        }
    }
}
