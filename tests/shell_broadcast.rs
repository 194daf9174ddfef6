use std::io::Write;
use std::process::{Command, Stdio};

#[test]
fn broadcast_subshell_delivers_stdin_to_every_child() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_eshell"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn eshell");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(stdin, "(cat & cat)").expect("write command");
        writeln!(stdin, "hello").expect("write broadcast payload");
    }
    // Dropping stdin (end of scope above, then the child handle takes over
    // the remaining drop) signals EOF to the repeater loop, which then
    // closes every child's write end and the REPL itself sees EOF next.
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("wait output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    let hello_count = stdout.matches("hello").count();
    assert_eq!(hello_count, 2, "stdout was: {stdout}");
    assert!(stdout.contains("EOF detected"), "stdout was: {stdout}");
}
