use std::io::Write;
use std::process::{Command, Stdio};

fn run_shell(lines: &[&str]) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_eshell"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn eshell");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        for line in lines {
            writeln!(stdin, "{line}").expect("write line");
        }
    }

    child.wait_with_output().expect("wait output")
}

#[test]
fn prompt_and_echo_then_next_prompt() {
    let output = run_shell(&["echo hi"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "/> hi\n/> \nEOF detected. Exiting eshell.\n");
}

#[test]
fn quit_exits_without_printing_eof_message() {
    let output = run_shell(&["quit"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "/> ");
    assert!(output.status.success());
}

#[test]
fn eof_prints_message_and_exits_successfully() {
    let output = run_shell(&[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "/> \nEOF detected. Exiting eshell.\n");
    assert!(output.status.success());
}

#[test]
fn unparseable_line_reprompts_silently() {
    let output = run_shell(&["(unterminated", "echo ok"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok"), "stdout was: {stdout}");
    assert!(
        !output.status.code().is_none(),
        "process should still exit cleanly after a parse error"
    );
}
