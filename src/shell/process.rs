//! Raw process-graph primitives: fork, pipe, dup2, exec-in-place, wait.
//!
//! Unix-only: uses `fork(2)` directly so a child can re-enter the dispatcher
//! in place (as opposed to spawning a new program image, which
//! `std::process::Command::spawn` would do).

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::Command as StdCommand;

/// The outcome of [`fork`] in the calling thread.
pub enum Fork {
    Parent(libc::pid_t),
    Child,
}

/// `fork(2)`. Safety: the child shares all open file descriptors with the
/// parent until it `dup2`s/`close`s/`exec`s them away; callers must not run
/// non-async-signal-safe code (allocating, locking) between `fork` and the
/// next `exec`/`exit` in the child beyond what this module itself does.
pub fn fork() -> io::Result<Fork> {
    // SAFETY: fork() is safe to call; the returned pid tells us which side
    // of the fork we're on. We avoid non-reentrant work before exec/exit.
    let pid = unsafe { libc::fork() };
    if pid < 0 {
        return Err(io::Error::last_os_error());
    }
    if pid == 0 {
        Ok(Fork::Child)
    } else {
        Ok(Fork::Parent(pid))
    }
}

/// Create an anonymous pipe (`os_pipe` gives cross-platform pipe plumbing
/// without shelling out to libc's `pipe(2)` directly).
pub fn make_pipe() -> io::Result<(os_pipe::PipeReader, os_pipe::PipeWriter)> {
    os_pipe::pipe()
}

/// `dup2(2)`, retrying on `EINTR`.
pub fn dup2(old: RawFd, new: RawFd) -> io::Result<()> {
    loop {
        // SAFETY: old/new are valid fds for the duration of this call.
        let rc = unsafe { libc::dup2(old, new) };
        if rc >= 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(err);
    }
}

/// Best-effort `close(2)` for pipe ends once they've been duplicated or are
/// no longer needed.
pub fn close(fd: RawFd) {
    // SAFETY: fd is a raw fd we own and are finished with.
    unsafe {
        libc::close(fd);
    }
}

pub fn dup2_from(src: &impl AsRawFd, new: RawFd) -> io::Result<()> {
    dup2(src.as_raw_fd(), new)
}

/// Replace the current process image with `program argv...`, searching
/// `PATH` the way `execvp` does. Never returns on success.
pub fn exec_replace(program: &str, args: &[String]) -> io::Error {
    StdCommand::new(program).args(args).exec()
}

/// Wait for a specific child to exit or be killed by a signal, ignoring
/// stop notifications (`WUNTRACED`) since this shell has no job control.
pub fn wait_pid(pid: libc::pid_t) -> io::Result<()> {
    loop {
        let mut status: libc::c_int = 0;
        // SAFETY: pid is a valid child pid; status is a valid out-pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, libc::WUNTRACED) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(err);
        }
        // SAFETY: status was just filled in by waitpid above.
        if unsafe { libc::WIFEXITED(status) } || unsafe { libc::WIFSIGNALED(status) } {
            return Ok(());
        }
    }
}

/// Reap every child of this process until none remain: a drain performed
/// after forking a pipeline or parallel group.
pub fn wait_all() {
    loop {
        // SAFETY: passing NULL for the status out-pointer is valid per wait(2).
        let rc = unsafe { libc::wait(std::ptr::null_mut()) };
        if rc <= 0 {
            break;
        }
    }
}

/// Ignore `SIGPIPE` in the calling process, so that writing to a pipe whose
/// reader has exited returns `EPIPE` instead of killing us — used by the
/// broadcast repeater.
pub fn ignore_sigpipe() {
    // SAFETY: signal() with SIG_IGN is always valid.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}
