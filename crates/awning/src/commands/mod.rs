//! Command dispatch: bridges CLI args to the bridge client or the
//! automation run, then to output formatting.

pub mod auto;
pub mod device;

use awning_config::Settings;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

use self::device::Manual;

/// Dispatch a command that needs loaded settings.
pub async fn dispatch(
    cmd: Command,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let manual = match cmd {
        Command::Auto(args) => return auto::handle(&args, settings, global).await,
        Command::Status => return device::status(&device::client(settings)?, global).await,
        Command::Info => return device::info(&device::client(settings)?, global).await,
        Command::Open => Manual::Open,
        Command::Close => Manual::Close,
        Command::Stop => Manual::Stop,
        Command::Toggle => Manual::Toggle,
        // Completions are handled before settings are loaded
        Command::Completions(_) => unreachable!(),
    };
    device::act(&device::client(settings)?, manual, global).await
}
