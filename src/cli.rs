use std::env;
use std::ffi::OsString;

use clap::{crate_version, App, AppSettings, Arg, ErrorKind};

use crate::errors::*;
use crate::process::trace::TraceFailurePolicy;
use crate::process::{CommandLine, LaunchConfig};

pub fn get_args_parser() -> App<'static, 'static> {
    App::new("launcher")
        .about("Declare this process traceable by its parent, then execute *path* in its place.")
        .version(crate_version!())
        // everything from *path* onwards belongs to the target, flags included
        .setting(AppSettings::TrailingVarArg)
        .arg(Arg::with_name("on-trace-error")
            .long("on-trace-error")
            .help("What to do when the trace request is rejected: log it and go on, or exit.")
            .takes_value(true)
            .possible_values(TraceFailurePolicy::VARIANTS)
            .default_value("warn"))
        .arg(Arg::with_name("sync-stop")
            .long("sync-stop")
            .help("Stop with SIGSTOP once traceable, before executing *path*."))
        .arg(Arg::with_name("command")
            .value_name("path")
            .help("Program to execute, followed by its arguments.")
            .multiple(true))
}

pub fn parse_config() -> Result<(LaunchConfig, CommandLine)> {
    parse_args(env::args_os())
}

pub fn parse_args<I, T>(args: I) -> Result<(LaunchConfig, CommandLine)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match get_args_parser().get_matches_from_safe(args) {
        Ok(matches) => matches,
        Err(err) => match err.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => err.exit(),
            _ => return Err(Error::Argument(err.message)),
        },
    };

    debug!("launcher startup with args:\n{:#?}", matches);

    // option --on-trace-error
    let on_trace_error = match matches.value_of("on-trace-error") {
        Some(value) => value.parse()?,
        None => TraceFailurePolicy::default(),
    };

    // option --sync-stop
    let sync_stop = matches.is_present("sync-stop");

    // path and forwarded arguments
    let values = matches.values_of_os("command").into_iter().flatten();
    let command = CommandLine::from_values(values)?;

    let config = LaunchConfig {
        on_trace_error: on_trace_error,
        sync_stop: sync_stop,
    };

    Ok((config, command))
}
