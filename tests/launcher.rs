use std::io::Read;
use std::process::{Command, Stdio};

use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

/// The built launcher, with its own logging turned off so that only the
/// unconditional diagnostic can reach stderr.
fn launcher() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_launcher"));
    command.env("RUST_LOG", "off");
    command
}

#[test]
fn test_no_arguments_is_a_reported_usage_error() {
    let output = launcher().output().expect("run launcher");

    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("launcher: "));
}

#[test]
fn test_invalid_option_is_a_usage_error() {
    let output = launcher()
        .args(&["--on-trace-error", "abort", "/bin/true"])
        .output()
        .expect("run launcher");

    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_missing_program_exits_with_exec_failure() {
    // the exec fails, so the trace request never produces a stop here
    let output = launcher()
        .arg("/nonexistent/path")
        .output()
        .expect("run launcher");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/path"));
}

#[test]
fn test_target_runs_under_this_process_as_tracer() {
    let mut child = launcher()
        .args(&["/bin/echo", "hello"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn launcher");
    let pid = Pid::from_raw(child.id() as i32);
    let mut stops = vec![];

    let exit_code = loop {
        match waitpid(pid, None).expect("waitpid launcher") {
            WaitStatus::Stopped(_, signal) => {
                stops.push(signal);
                ptrace::cont(pid, None).expect("restart tracee");
            }
            WaitStatus::Exited(_, code) => break code,
            status => panic!("unexpected status: {:?}", status),
        }
    };

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .expect("piped stdout")
        .read_to_string(&mut stdout)
        .expect("read stdout");

    assert_eq!(exit_code, 0);
    assert_eq!(stops, vec![Signal::SIGTRAP]);
    assert_eq!(stdout, "hello\n");
}
