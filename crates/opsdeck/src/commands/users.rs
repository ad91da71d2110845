use std::sync::Arc;

use chrono::Utc;
use tabled::Tabled;

use opsdeck_core::editor::create_user;
use opsdeck_core::model::UserDraft;
use opsdeck_core::{Repository, User, UserRole};

use crate::cli::{GlobalOpts, UserRoleArg, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;
use crate::state::Session;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Login")]
    last_login: String,
}

impl From<&Arc<User>> for UserRow {
    fn from(u: &Arc<User>) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            status: u.status.to_string(),
            last_login: u
                .last_login
                .map_or_else(|| "never".into(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

pub fn handle(session: &Session, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let users = session.store().users();

    match args.command {
        UsersCommand::List => {
            let out = output::render_list(&global.output, &users.list(), |x| UserRow::from(x), |u| {
                u.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Create {
            username,
            email,
            role,
            password,
        } => {
            let password = util::secret_or_prompt(password, "Password: ")?;
            let role = match role {
                UserRoleArg::Admin => UserRole::Admin,
                UserRoleArg::Operator => UserRole::Operator,
                UserRoleArg::Viewer => UserRole::Viewer,
            };
            let user = create_user(
                users,
                UserDraft {
                    username,
                    email,
                    password,
                    role,
                },
                Utc::now(),
            )?;
            session.persist(global.quiet)?;
            output::print_output(&user.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ User '{}' created as {}", user.username, user.role);
            }
            Ok(())
        }
    }
}
