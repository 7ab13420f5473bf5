//! Command dispatch: bridges CLI args -> core components -> output formatting.

pub mod config_cmd;
pub mod detect;
pub mod device;

use hydrobot_core::{Actuator, LinkConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a network-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, link: &LinkConfig, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => device::status(link, global).await,
        Command::Led(args) => device::switch(link, Actuator::Led, args.state, global).await,
        Command::Pump(args) => device::switch(link, Actuator::Pump, args.state, global).await,
        Command::Stream(args) => device::stream(link, &args, global).await,
        Command::Detect(args) => detect::handle(link, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
