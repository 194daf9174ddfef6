//! The four top-level dispatch strategies plus the two subshell strategies.
//! `dispatch` is the single function reused recursively at every nesting
//! level for recursive subshells.

use tracing::{debug, warn};

use crate::shell::ast::{Command, ParsedInput, Separator, SingleInput};
use crate::shell::broadcast;
use crate::shell::pipeline;
use crate::shell::process::{self, Fork};

/// Dispatch one parsed line (or one re-parsed subshell body) on its top
/// separator. Runs to completion; never returns a value since no exit-code
/// propagation exists in this grammar.
pub fn dispatch(input: &ParsedInput) {
    match input.separator {
        Separator::Pipe => {
            if let Err(e) = pipeline::run_top_level_pipeline(&input.inputs) {
                warn!(error = %e, "pipeline failed");
            }
        }
        Separator::Seq => run_sequential(&input.inputs),
        Separator::Para => run_parallel(&input.inputs),
        Separator::None => run_single_top(&input.inputs[0]),
    }
}

fn run_single_top(single: &SingleInput) {
    match single {
        SingleInput::Command(cmd) => run_command(cmd),
        SingleInput::Pipeline(cmds) => {
            if let Err(e) = pipeline::run_command_pipeline(cmds) {
                warn!(error = %e, "pipeline failed");
            }
        }
        SingleInput::Subshell(body) => run_subshell(body),
    }
}

/// Run a single external command: fork, exec in the child, wait in the parent.
pub fn run_command(cmd: &Command) {
    match process::fork() {
        Err(e) => eprintln!("eshell: fork: {e}"),
        Ok(Fork::Child) => {
            let err = process::exec_replace(&cmd.program, &cmd.args);
            eprintln!("eshell: {}: {err}", cmd.program);
            std::process::exit(127);
        }
        Ok(Fork::Parent(pid)) => {
            if let Err(e) = process::wait_pid(pid) {
                warn!(error = %e, pid, "waitpid failed");
            }
        }
    }
}

/// `a ; b ; c`: run each child to completion, in order.
fn run_sequential(inputs: &[SingleInput]) {
    for input in inputs {
        match input {
            SingleInput::Command(cmd) => run_command(cmd),
            SingleInput::Pipeline(cmds) => {
                if let Err(e) = pipeline::run_command_pipeline(cmds) {
                    warn!(error = %e, "pipeline failed");
                }
            }
            SingleInput::Subshell(_) => {
                eprintln!("eshell: unsupported input type for sequential execution");
            }
        }
    }
}

/// `a & b & c`: fork one child per input, then wait for all.
fn run_parallel(inputs: &[SingleInput]) {
    let mut pids = Vec::with_capacity(inputs.len());

    for input in inputs {
        match process::fork() {
            Err(e) => {
                eprintln!("eshell: fork: {e}");
            }
            Ok(Fork::Child) => {
                match input {
                    SingleInput::Command(cmd) => {
                        let err = process::exec_replace(&cmd.program, &cmd.args);
                        eprintln!("eshell: {}: {err}", cmd.program);
                        std::process::exit(127);
                    }
                    SingleInput::Pipeline(cmds) => {
                        let _ = pipeline::run_command_pipeline(cmds);
                        std::process::exit(0);
                    }
                    SingleInput::Subshell(_) => {
                        eprintln!("eshell: unsupported input type in parallel execution");
                        std::process::exit(1);
                    }
                }
            }
            Ok(Fork::Parent(pid)) => pids.push(pid),
        }
    }

    for pid in pids {
        if let Err(e) = process::wait_pid(pid) {
            warn!(error = %e, pid, "waitpid failed");
        }
    }
}

/// Isolated subshell (`(...)` alone): fork a child that re-parses and
/// re-dispatches the body; the parent just waits.
fn run_subshell(body: &str) {
    // A parallel subshell group `(a & b & ...)` is the broadcast operator,
    // not a plain isolated subshell — recognize it before forking so the
    // parent, not a grandchild, owns the stdin repeater.
    if let Ok(parsed) = crate::shell::parser::parse(body) {
        if parsed.separator == Separator::Para {
            if let Err(e) = broadcast::run_broadcast_subshell(&parsed.inputs) {
                warn!(error = %e, "broadcast subshell failed");
            }
            return;
        }
    }

    match process::fork() {
        Err(e) => eprintln!("eshell: fork: {e}"),
        Ok(Fork::Child) => {
            match crate::shell::parser::parse(body) {
                Ok(parsed) => {
                    debug!(%body, "re-entering dispatcher for subshell");
                    dispatch(&parsed);
                }
                Err(e) => eprintln!("eshell: {e}"),
            }
            std::process::exit(0);
        }
        Ok(Fork::Parent(pid)) => {
            if let Err(e) = process::wait_pid(pid) {
                warn!(error = %e, pid, "waitpid failed");
            }
        }
    }
}
