use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Poll discovery until it completes (default).
    Run,
    /// Print the current progress line.
    Status,
    /// Throw away the checkpoint so the next run starts over.
    Reset,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: PathBuf,
    pub command: Command,
}

/// `warden [--config PATH] [status|reset|run]`, program name already stripped.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut command = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => match iter.next() {
                Some(path) => config_path = PathBuf::from(path),
                None => bail!("--config needs a path"),
            },
            "run" | "status" | "reset" if command.is_some() => {
                bail!("Only one command may be given")
            }
            "run" => command = Some(Command::Run),
            "status" => command = Some(Command::Status),
            "reset" => command = Some(Command::Reset),
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(Invocation {
        config_path,
        command: command.unwrap_or(Command::Run),
    })
}

pub fn usage() -> &'static str {
    "Usage: warden [--config PATH] [status|reset|run]"
}
