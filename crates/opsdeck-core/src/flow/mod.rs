// ── Call-flow export ──
//
// Graph validation and the AGI script generator.

mod agi;
mod export;
mod validate;

pub use agi::{FALLBACK_START_MENU, NOT_SET, generate_agi_script, greeting_prompt};
pub use export::{CallFlowExport, SCRIPT_FILE_NAME, export_call_flow};
pub use validate::{
    Issue, IssueKind, Severity, ValidationPolicy, ValidationReport, validate, validate_with,
};
