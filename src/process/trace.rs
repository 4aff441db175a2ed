use std::fmt;
use std::str::FromStr;

use nix::sys::ptrace;
use nix::sys::signal::{self, Signal};

use crate::errors::*;

/// What the launcher does when the kernel refuses `PTRACE_TRACEME`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceFailurePolicy {
    /// Log the rejection and launch the target anyway.
    Warn,
    /// Stop before the image replacement and exit with `EXIT_TRACE_FAILURE`.
    Fatal,
}

impl TraceFailurePolicy {
    pub const VARIANTS: &'static [&'static str] = &["warn", "fatal"];
}

impl Default for TraceFailurePolicy {
    fn default() -> Self {
        TraceFailurePolicy::Warn
    }
}

impl FromStr for TraceFailurePolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "warn" => Ok(TraceFailurePolicy::Warn),
            "fatal" => Ok(TraceFailurePolicy::Fatal),
            other => Err(Error::Argument(format!(
                "unknown trace failure policy: {} (expected one of: {})",
                other,
                TraceFailurePolicy::VARIANTS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for TraceFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TraceFailurePolicy::Warn => write!(f, "warn"),
            TraceFailurePolicy::Fatal => write!(f, "fatal"),
        }
    }
}

/// Declares this process as traceable by its parent.
///
/// The kernel rejects the request with `EPERM` when the process is already
/// being traced.
pub fn request_trace() -> Result<()> {
    ptrace::traceme().map_err(Error::TraceRequest)
}

/// Stops this process with a `SIGSTOP`, so that a tracer which is not waiting
/// yet sees a stop before the exec trap.
pub fn sync_stop() -> Result<()> {
    signal::raise(Signal::SIGSTOP).map_err(Error::Sync)
}
