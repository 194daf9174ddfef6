//! The broadcast parallel subshell: `(x1 & x2 & ... & xk)` connects the
//! parent's own stdin to every child, replicating each buffer read.

use std::io::{Read, Write};
use std::os::unix::io::AsRawFd;

use tracing::debug;

use crate::shell::ast::SingleInput;
use crate::shell::error::Error;
use crate::shell::process::{self, Fork};

/// Bytes read from the parent's stdin per repeater iteration.
const BROADCAST_BUFFER_SIZE: usize = 256 * 1024;

/// Run `(x1 & x2 & ... & xk)`: fork one child per `xi` with its stdin
/// dup'd from a dedicated pipe, then replicate the parent's stdin to all
/// of them until EOF.
pub fn run_broadcast_subshell(inputs: &[SingleInput]) -> Result<(), Error> {
    if inputs.is_empty() {
        return Ok(());
    }

    let mut write_ends = Vec::with_capacity(inputs.len());

    for input in inputs {
        let (reader, writer) = match process::make_pipe() {
            Ok(pair) => pair,
            Err(e) => {
                process::wait_all();
                return Err(Error::Spawn(e));
            }
        };

        match process::fork() {
            Err(e) => {
                process::wait_all();
                return Err(Error::Spawn(e));
            }
            Ok(Fork::Child) => {
                process::close(writer.as_raw_fd());
                let _ = process::dup2_from(&reader, libc::STDIN_FILENO);
                drop(reader);

                match input {
                    SingleInput::Command(cmd) => {
                        let err = process::exec_replace(&cmd.program, &cmd.args);
                        eprintln!("eshell: {}: {err}", cmd.program);
                        std::process::exit(127);
                    }
                    SingleInput::Pipeline(commands) => {
                        let _ = crate::shell::pipeline::run_command_pipeline(commands);
                        std::process::exit(0);
                    }
                    SingleInput::Subshell(_) => {
                        eprintln!("eshell: unsupported input type in broadcast subshell");
                        std::process::exit(1);
                    }
                }
            }
            Ok(Fork::Parent(_pid)) => {
                drop(reader);
                write_ends.push(writer);
            }
        }
    }

    repeat_stdin(&mut write_ends);
    drop(write_ends);
    process::wait_all();
    Ok(())
}

/// Read from the parent's own stdin and duplicate each buffer to every
/// still-alive child write end, until stdin hits EOF.
///
/// `SIGPIPE` is ignored by the caller so a dead child surfaces here as an
/// `EPIPE`/`BrokenPipe` write error rather than a signal; such a child's
/// write end is dropped and broadcasting continues to the rest, keeping
/// surviving children fed rather than aborting the whole repeater.
fn repeat_stdin(write_ends: &mut Vec<os_pipe::PipeWriter>) {
    process::ignore_sigpipe();

    let mut buffer = vec![0u8; BROADCAST_BUFFER_SIZE];
    let mut stdin = std::io::stdin();

    loop {
        let n = match stdin.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        };

        write_ends.retain_mut(|writer| match writer.write_all(&buffer[..n]) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "broadcast child gone, dropping its write end");
                false
            }
        });

        if write_ends.is_empty() {
            break;
        }
    }
}
