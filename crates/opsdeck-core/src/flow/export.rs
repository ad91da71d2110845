// ── Validating export pipeline ──

use serde::Serialize;

use super::agi::generate_agi_script;
use super::validate::{Issue, ValidationPolicy, validate_with};
use crate::error::CoreError;
use crate::model::CallFlowMenu;

/// File name operators deploy the script under.
pub const SCRIPT_FILE_NAME: &str = "ivr_handler.py";

/// A generated handler plus the warnings found while validating it.
#[derive(Debug, Clone, Serialize)]
pub struct CallFlowExport {
    pub script: String,
    pub warnings: Vec<Issue>,
}

/// Validate the graph, then generate the script.
///
/// Fails with [`CoreError::InvalidGraph`] when any error-level issue is
/// present; nothing is generated in that case.
pub fn export_call_flow(
    menus: &[CallFlowMenu],
    policy: ValidationPolicy,
) -> Result<CallFlowExport, CoreError> {
    let report = validate_with(menus, policy);
    if report.has_errors() {
        tracing::warn!(errors = report.errors().count(), "call flow export refused");
        return Err(CoreError::InvalidGraph { report });
    }

    let warnings: Vec<Issue> = report.warnings().cloned().collect();
    for warning in &warnings {
        tracing::warn!(%warning, "call flow warning");
    }

    Ok(CallFlowExport {
        script: generate_agi_script(menus),
        warnings,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EntityId, MenuAction, MenuOption};
    use crate::store::seed;

    #[test]
    fn clean_graph_exports() {
        let export = export_call_flow(&seed::menus(), ValidationPolicy::default()).unwrap();
        assert!(export.warnings.is_empty());
        assert_eq!(export.script, generate_agi_script(&seed::menus()));
    }

    #[test]
    fn dangling_target_blocks_export() {
        let mut menus = seed::menus();
        menus[0].options.push(MenuOption {
            key: "9".into(),
            action: MenuAction::Menu,
            target: Some("404".into()),
            ..MenuOption::placeholder()
        });
        let err = export_call_flow(&menus, ValidationPolicy::default()).unwrap_err();
        match err {
            CoreError::InvalidGraph { report } => assert_eq!(report.errors().count(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn warnings_travel_with_script() {
        let mut menus = seed::menus();
        menus[0].options.push(MenuOption {
            id: EntityId::from("x"),
            ..MenuOption::placeholder()
        });
        let export = export_call_flow(&menus, ValidationPolicy::default()).unwrap();
        // Empty key plus unset extension target.
        assert_eq!(export.warnings.len(), 2);
        assert!(export.script.contains("<not set>"));
    }
}
