//! The pipeline builder: wires `n` stages through `n-1` anonymous pipes,
//! forking one child per stage before any `wait`.
//!
//! Two callers share this core: a pure-command pipeline nested under `;`/`&`
//! (every stage is a [`Command`]), and the top-level pipeline dispatch,
//! whose stages may additionally be subshells.

use std::os::unix::io::AsRawFd;

use tracing::warn;

use crate::shell::ast::{Command, SingleInput};
use crate::shell::error::Error;
use crate::shell::process::{self, Fork};

/// One stage of a pipeline: either a plain external command or a subshell
/// whose body re-enters the dispatcher in the child.
enum Stage<'a> {
    Command(&'a Command),
    Subshell(&'a str),
}

/// Run a pure-command pipeline (no subshell stages) — the form nested
/// inside a `;`/`&`-separated item.
pub fn run_command_pipeline(commands: &[Command]) -> Result<(), Error> {
    let stages: Vec<Stage> = commands.iter().map(Stage::Command).collect();
    run_pipeline(&stages)
}

/// Run a top-level pipeline, whose stages may be commands or subshells
/// (`(a ; b) | c`).
pub fn run_top_level_pipeline(inputs: &[SingleInput]) -> Result<(), Error> {
    let mut stages = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            SingleInput::Command(cmd) => stages.push(Stage::Command(cmd)),
            SingleInput::Subshell(body) => stages.push(Stage::Subshell(body)),
            SingleInput::Pipeline(_) => {
                eprintln!("eshell: unsupported nested pipeline in top-level pipeline stage");
                return Ok(());
            }
        }
    }
    run_pipeline(&stages)
}

fn run_pipeline(stages: &[Stage]) -> Result<(), Error> {
    if stages.is_empty() {
        return Ok(());
    }

    let n = stages.len();
    // stdin for the next stage, inherited from the previous stage's pipe
    // read end. `None` means "inherit the parent's own stdin" (stage 0).
    let mut next_stdin: Option<os_pipe::PipeReader> = None;

    for (i, stage) in stages.iter().enumerate() {
        let is_last = i + 1 == n;

        let stdout_pipe = if is_last {
            None
        } else {
            match process::make_pipe() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(error = %e, "failed to create pipe");
                    process::wait_all();
                    return Err(Error::Spawn(e));
                }
            }
        };

        match process::fork() {
            Err(e) => {
                warn!(error = %e, "fork failed");
                process::wait_all();
                return Err(Error::Spawn(e));
            }
            Ok(Fork::Child) => {
                if let Some(reader) = next_stdin.take() {
                    let _ = process::dup2_from(&reader, libc::STDIN_FILENO);
                }
                if let Some((reader, writer)) = &stdout_pipe {
                    process::close(reader.as_raw_fd());
                    let _ = process::dup2_from(writer, libc::STDOUT_FILENO);
                }

                match stage {
                    Stage::Command(cmd) => {
                        let err = process::exec_replace(&cmd.program, &cmd.args);
                        eprintln!("eshell: {}: {err}", cmd.program);
                        std::process::exit(127);
                    }
                    Stage::Subshell(body) => {
                        match crate::shell::parser::parse(body) {
                            Ok(parsed) => crate::shell::executor::dispatch(&parsed),
                            Err(e) => eprintln!("eshell: {e}"),
                        }
                        std::process::exit(0);
                    }
                }
            }
            Ok(Fork::Parent(_pid)) => {
                // Drop our copy of the previous reader (the child dup'd it).
                drop(next_stdin.take());
                if let Some((reader, writer)) = stdout_pipe {
                    // Parent keeps the new read end for the next stage and
                    // closes the write end it only handed to this child.
                    drop(writer);
                    next_stdin = Some(reader);
                }
            }
        }
    }

    drop(next_stdin);
    process::wait_all();
    Ok(())
}
