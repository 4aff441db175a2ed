#![allow(clippy::redundant_field_names)]

extern crate clap;
extern crate libc;
extern crate nix;
#[macro_use]
extern crate log;

mod cli;
mod errors;
mod process;

use std::convert::Infallible;

use crate::errors::Result;
use crate::process::Environment;

fn run() -> Result<Infallible> {
    // step 1: snapshot the environment before anything else can touch it
    let env = Environment::capture();

    // step 2: CLI parsing
    let (config, command) = cli::parse_config()?;
    debug!(
        "launch config: {:?}, command: {:?}, {} environment variables",
        config,
        command,
        env.len()
    );

    // step 3: become traceable, then execute the target in place;
    // only a failure comes back here
    process::launch(config, command, env)
}

fn main() {
    env_logger::init();
    match run() {
        Ok(never) => match never {},
        Err(err) => {
            error!("Exited with error: {}", err);
            // the logger may be filtered out by RUST_LOG, this line is not
            eprintln!("launcher: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}
