//! Command dispatch: bridges CLI args -> core editors -> output formatting.

pub mod alerts;
pub mod analytics;
pub mod backups;
pub mod calls;
pub mod config_cmd;
pub mod devices;
pub mod email;
pub mod interfaces;
pub mod menus;
pub mod overview;
pub mod settings;
pub mod users;
pub mod util;
pub mod vlans;
pub mod vpn;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::state::Session;

/// Dispatch a workspace-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Menus(args) => menus::handle(session, args, global),
        Command::Settings(args) => settings::handle(args, global).await,
        Command::Calls(args) => calls::handle(session, args, global).await,
        Command::Analytics(args) => analytics::handle(args, global),
        Command::Overview => overview::handle(session, global),
        Command::Devices(args) => devices::handle(session, args, global).await,
        Command::Interfaces(args) => interfaces::handle(session, args, global),
        Command::Vlans(args) => vlans::handle(session, args, global),
        Command::Vpn(args) => vpn::handle(session, args, global),
        Command::Alerts(args) => alerts::handle(session, args, global),
        Command::Backups(args) => backups::handle(session, args, global),
        Command::Users(args) => users::handle(session, args, global),
        Command::Email(args) => email::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
