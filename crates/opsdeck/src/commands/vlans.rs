use std::sync::Arc;

use tabled::Tabled;

use opsdeck_core::editor::create_vlan;
use opsdeck_core::model::VlanDraft;
use opsdeck_core::{Repository, Vlan};

use crate::cli::{GlobalOpts, VlansArgs, VlansCommand};
use crate::error::CliError;
use crate::output;
use crate::state::Session;

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Tag")]
    tag: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Arc<Vlan>> for VlanRow {
    fn from(v: &Arc<Vlan>) -> Self {
        Self {
            id: v.id.to_string(),
            tag: v.vlan_id,
            name: v.name.clone(),
            interface: v.interface.clone(),
            status: v.status.to_string(),
            ports: if v.ports.is_empty() { "-".into() } else { v.ports.join(", ") },
            description: v.description.clone(),
        }
    }
}

pub fn handle(session: &Session, args: VlansArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let vlans = session.store().vlans();

    match args.command {
        VlansCommand::List => {
            let out = output::render_list(&global.output, &vlans.list(), |x| VlanRow::from(x), |v| {
                v.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::Create {
            vlan_id,
            name,
            interface,
            description,
        } => {
            let vlan = create_vlan(
                vlans,
                VlanDraft {
                    vlan_id,
                    name,
                    interface,
                    description,
                },
            )?;
            session.persist(global.quiet)?;
            output::print_output(&vlan.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ VLAN {} '{}' created on {}", vlan.vlan_id, vlan.name, vlan.interface);
            }
            Ok(())
        }
    }
}
