//! Caller profile handlers.

use birdwatch_core::{Command as CoreCommand, Session, UserProfile};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(session: &Session, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if session.identity().await.is_none() {
        return Err(CliError::NoCredentials {
            profile: global.profile.clone().unwrap_or_else(|| "default".into()),
        });
    }

    match args.command {
        ProfileCommand::Show => {
            let profile = util::settled(session.caller_profile().await)?;
            let Some(profile) = Option::as_ref(&profile) else {
                if !global.quiet {
                    eprintln!("No profile saved. Set one with: birdwatch profile set <name>");
                }
                return Ok(());
            };
            let out = output::render_single(
                &global.output,
                profile,
                |p| format!("Name: {}", p.name),
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Set { name } => {
            session
                .execute(CoreCommand::SaveProfile(UserProfile { name: name.clone() }))
                .await?;
            if !global.quiet {
                eprintln!("✓ Profile name set to '{name}'");
            }
            Ok(())
        }
    }
}
