//! Command dispatch: bridges CLI args -> session queries and commands ->
//! output formatting.

pub mod birds;
pub mod config_cmd;
pub mod export;
pub mod locations;
pub mod map;
pub mod media;
pub mod profile;
pub mod stats;
pub mod util;
pub mod whoami;

use birdwatch_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Birds(args) => birds::handle(session, args, global).await,
        Command::Locations(args) => locations::handle(session, args, global).await,
        Command::Map(args) => map::handle(session, args, global).await,
        Command::Stats => stats::handle(session, global).await,
        Command::Export(args) => export::handle(session, args, global).await,
        Command::Media(args) => media::handle(session, args, global).await,
        Command::Whoami => whoami::handle(session, global).await,
        Command::Profile(args) => profile::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not need a session".into(),
        )),
    }
}
