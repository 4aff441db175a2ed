use nix::errno::Errno;
use std::ffi::NulError;
use std::path::PathBuf;
use std::{error, fmt, result};

pub type Result<T> = result::Result<T, Error>;

/// Exit status used when the image replacement is rejected by the kernel.
pub const EXIT_EXEC_FAILURE: i32 = libc::EXIT_FAILURE;
/// Exit status used for a missing target path or an invalid option.
pub const EXIT_USAGE: i32 = 2;
/// Exit status used when the tracer could not be bound or synchronised with.
pub const EXIT_TRACE_FAILURE: i32 = 3;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Missing or invalid command-line input.
    Argument(String),
    /// `ptrace(PTRACE_TRACEME)` was rejected.
    TraceRequest(Errno),
    /// The synchronisation `SIGSTOP` could not be raised.
    Sync(Errno),
    /// `execve` returned, so the target image never started.
    Exec(PathBuf, Errno),
}

impl Error {
    pub fn missing_path() -> Error {
        Error::Argument("missing the path of the program to launch".to_string())
    }

    pub fn nul_byte(what: &str, error: NulError) -> Error {
        Error::Argument(format!(
            "{} contains a nul byte at position {}",
            what,
            error.nul_position()
        ))
    }

    /// The status this process terminates with when the error reaches `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Argument(_) => EXIT_USAGE,
            Error::TraceRequest(_) | Error::Sync(_) => EXIT_TRACE_FAILURE,
            Error::Exec(_, _) => EXIT_EXEC_FAILURE,
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Argument(_) => None,
            Error::TraceRequest(errno) | Error::Sync(errno) | Error::Exec(_, errno) => Some(errno),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Argument(message) => write!(f, "Invalid arguments: {}", message),
            // EPERM is also what a process already attached by its tracer gets
            Error::TraceRequest(Errno::EPERM) => write!(
                f,
                "Trace request rejected (EPERM: already traced or not permitted)"
            ),
            Error::TraceRequest(errno) => {
                write!(f, "Trace request rejected ({:?}: {})", errno, errno.desc())
            }
            Error::Sync(errno) => write!(
                f,
                "Failed to stop for tracer synchronisation: {:?}: {}",
                errno,
                errno.desc()
            ),
            Error::Exec(path, errno) => {
                write!(f, "Failed to execute {:?}: {:?}: {}", path, errno, errno.desc())
            }
        }
    }
}
