use std::sync::Arc;

use chrono::Utc;
use tabled::Tabled;

use opsdeck_core::editor::create_backup;
use opsdeck_core::format::format_bytes;
use opsdeck_core::model::Backup;
use opsdeck_core::Repository;

use crate::cli::{BackupsArgs, BackupsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::state::Session;

use super::util;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Arc<Backup>> for BackupRow {
    fn from(b: &Arc<Backup>) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name.clone(),
            device: b.device.clone(),
            created: b.created_at.format("%Y-%m-%d %H:%M").to_string(),
            size: format_bytes(b.size_bytes),
            kind: b.kind.to_string(),
            status: b.status.to_string(),
        }
    }
}

pub fn handle(session: &Session, args: BackupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = session.store();

    match args.command {
        BackupsCommand::List => {
            let out = output::render_list(
                &global.output,
                &store.backups().list(),
                |x| BackupRow::from(x),
                |b| b.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BackupsCommand::Create { name, device } => {
            let device = match device {
                Some(d) => Some(util::find_entity(store.devices(), &d, |d| d.name.as_str())?),
                None => store.focused_device(),
            };
            let backup = create_backup(
                store.backups(),
                device.as_deref(),
                name.as_deref(),
                Utc::now(),
            )?;
            session.persist(global.quiet)?;
            output::print_output(&backup.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ Backup '{}' of {} created", backup.name, backup.device);
            }
            Ok(())
        }
    }
}
