use std::sync::Arc;

use tabled::Tabled;

use opsdeck_core::format::format_bytes;
use opsdeck_core::summary::traffic_summary;
use opsdeck_core::{InterfaceStats, Repository};

use crate::cli::{GlobalOpts, InterfacesArgs, InterfacesCommand};
use crate::error::CliError;
use crate::output;
use crate::state::Session;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "RX Mbps")]
    rx_rate: String,
    #[tabled(rename = "TX Mbps")]
    tx_rate: String,
}

impl From<&Arc<InterfaceStats>> for InterfaceRow {
    fn from(i: &Arc<InterfaceStats>) -> Self {
        Self {
            name: i.name.clone(),
            kind: i.kind.clone(),
            state: i.state.to_string(),
            rx: format_bytes(i.rx_bytes),
            tx: format_bytes(i.tx_bytes),
            rx_rate: format!("{:.1}", i.rx_rate_mbps),
            tx_rate: format!("{:.1}", i.tx_rate_mbps),
        }
    }
}

pub fn handle(
    session: &Session,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let interfaces = session.store().interfaces().list();

    let out = match args.command {
        InterfacesCommand::List => output::render_list(
            &global.output,
            &interfaces,
            |x| InterfaceRow::from(x),
            |i| i.name.clone(),
        ),
        InterfacesCommand::Traffic => {
            let t = traffic_summary(&interfaces);
            output::render_single(
                &global.output,
                &t,
                |t| {
                    [
                        format!("Interfaces: {} ({} up)", t.interfaces, t.up),
                        format!("Received:   {}", format_bytes(t.rx_bytes)),
                        format!("Sent:       {}", format_bytes(t.tx_bytes)),
                        format!("RX rate:    {:.1} Mbps", t.rx_rate_mbps),
                        format!("TX rate:    {:.1} Mbps", t.tx_rate_mbps),
                    ]
                    .join("\n")
                },
                |t| t.interfaces.to_string(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
