use std::convert::Infallible;

use crate::errors::*;
use crate::process::environment::Environment;
use crate::process::image::{CommandLine, ProcessImage};
use crate::process::trace::{self, TraceFailurePolicy};

/// Options given before the target path on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Whether a rejected trace request aborts the launch.
    pub on_trace_error: TraceFailurePolicy,
    /// Raise a `SIGSTOP` between the trace request and the exec.
    pub sync_stop: bool,
}

/// Initial state: nothing has been asked to the kernel yet.
#[derive(Debug)]
pub struct Start;

/// The trace request has completed, successfully or not.
///
/// A rejected request does not mean the process is untraced: a tracer that
/// attached beforehand makes the kernel answer `EPERM` too.
#[derive(Debug)]
pub struct TraceRequested {
    outcome: Result<()>,
}

/// The worker side of a tracer/tracee pair.
///
/// The state parameter encodes the only allowed order: an image can be
/// replaced only by a launcher that went through `request_trace`, so the
/// tracer always gets its exec trap.
#[derive(Debug)]
pub struct Launcher<S> {
    config: LaunchConfig,
    image: ProcessImage,
    state: S,
}

impl Launcher<Start> {
    pub fn new(config: LaunchConfig, image: ProcessImage) -> Launcher<Start> {
        Launcher {
            config: config,
            image: image,
            state: Start,
        }
    }

    /// Issues `PTRACE_TRACEME`, then applies the configured policy to its
    /// outcome.
    pub fn request_trace(self) -> Result<Launcher<TraceRequested>> {
        let outcome = trace::request_trace();
        match &outcome {
            Ok(()) => debug!("trace request accepted"),
            Err(err) => match self.config.on_trace_error {
                TraceFailurePolicy::Fatal => return Err(err.clone()),
                TraceFailurePolicy::Warn => warn!(
                    "{} (on trace error: {}); launching {:?} anyway",
                    err,
                    self.config.on_trace_error,
                    self.image.path()
                ),
            },
        }

        if self.config.sync_stop {
            debug!("stopping for tracer synchronisation");
            trace::sync_stop()?;
        }

        Ok(Launcher {
            config: self.config,
            image: self.image,
            state: TraceRequested { outcome: outcome },
        })
    }

    /// Runs the whole sequence. Only returns if the target never started.
    pub fn run(self) -> Error {
        match self.request_trace() {
            Ok(launcher) => launcher.replace_image(),
            Err(err) => err,
        }
    }
}

impl Launcher<TraceRequested> {
    /// The error of the trace request, if the kernel rejected it.
    pub fn trace_error(&self) -> Option<&Error> {
        self.state.outcome.as_ref().err()
    }

    /// Hands the process over to the target. Returns only on failure.
    pub fn replace_image(self) -> Error {
        debug!(
            "execve {:?} argv={:?} ({} environment variables, trace request accepted: {})",
            self.image.path(),
            self.image.argv(),
            self.image.envp().len(),
            self.trace_error().is_none()
        );
        self.image.exec()
    }
}

/// Launches `command` as a traced image with `env` as its environment.
///
/// On success this never returns: the process now runs the target. Every
/// returned error is terminal for the process.
pub fn launch(
    config: LaunchConfig,
    command: CommandLine,
    env: Environment,
) -> Result<Infallible> {
    let image = ProcessImage::new(&command, &env)?;
    Err(Launcher::new(config, image).run())
}
