//! Call-flow menu command handlers.

use std::sync::Arc;

use tabled::{Table, Tabled, settings::Style};

use opsdeck_core::flow::{self, SCRIPT_FILE_NAME};
use opsdeck_core::{
    CallFlowMenu, EntityId, MenuAction, MenuEditor, MenuOption, ValidationPolicy,
};

use crate::cli::{
    FlowPolicyArgs, GlobalOpts, MenuActionArg, MenuFields, MenusArgs, MenusCommand, OptionFields,
};
use crate::error::CliError;
use crate::output::{self, Tone};
use crate::state::Session;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MenuRow {
    #[tabled(rename = "")]
    selected: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Options")]
    options: usize,
    #[tabled(rename = "Timeout")]
    timeout: String,
    #[tabled(rename = "Retries")]
    retries: u32,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl From<&MenuOption> for OptionRow {
    fn from(o: &MenuOption) -> Self {
        Self {
            id: o.id.to_string(),
            key: if o.key.is_empty() { "-".into() } else { o.key.clone() },
            label: o.label.clone(),
            action: o.action.to_string(),
            target: o.target().unwrap_or(flow::NOT_SET).to_owned(),
        }
    }
}

fn detail(m: &Arc<CallFlowMenu>) -> String {
    let mut lines = vec![
        format!("ID:       {}", m.id),
        format!("Name:     {}", m.name),
        format!("Greeting: {}", m.greeting),
        format!("Prompt:   {}", flow::greeting_prompt(m)),
        format!("Timeout:  {}s", m.timeout),
        format!("Retries:  {}", m.max_retries),
    ];
    if m.options.is_empty() {
        lines.push("Options:  (none)".into());
    } else {
        let rows: Vec<OptionRow> = m.options.iter().map(OptionRow::from).collect();
        lines.push(Table::new(rows).with(Style::rounded()).to_string());
    }
    lines.join("\n")
}

// ── Field application ───────────────────────────────────────────────

fn apply_menu_fields(menu: &mut CallFlowMenu, fields: MenuFields) -> Result<(), CliError> {
    if let Some(name) = fields.name {
        if name.trim().is_empty() {
            return Err(CliError::Validation {
                field: "name".into(),
                reason: "a menu name cannot be empty".into(),
            });
        }
        menu.name = name;
    }
    if let Some(greeting) = fields.greeting {
        menu.greeting = greeting;
    }
    if let Some(timeout) = fields.digit_timeout {
        menu.timeout = timeout;
    }
    if let Some(retries) = fields.retries {
        menu.max_retries = retries;
    }
    Ok(())
}

fn apply_option_fields(option: &mut MenuOption, fields: OptionFields) -> Result<(), CliError> {
    if let Some(key) = fields.key {
        let key = key.trim().to_owned();
        let is_dtmf = |c: char| c.is_ascii_digit() || c == '*' || c == '#';
        if key.chars().count() > 1 || !key.chars().all(is_dtmf) {
            return Err(CliError::Validation {
                field: "key".into(),
                reason: format!("'{key}' is not a single DTMF digit"),
            });
        }
        option.key = key;
    }
    if let Some(label) = fields.label {
        option.label = label;
    }
    if let Some(action) = fields.action {
        option.action = match action {
            MenuActionArg::Menu => MenuAction::Menu,
            MenuActionArg::Extension => MenuAction::Extension,
            MenuActionArg::Hangup => MenuAction::Hangup,
            MenuActionArg::Queue => MenuAction::Queue,
        };
    }
    if let Some(target) = fields.target {
        option.target = Some(target).filter(|t| !t.trim().is_empty());
    }
    Ok(())
}

fn policy(args: &FlowPolicyArgs) -> ValidationPolicy {
    ValidationPolicy {
        allow_cycles: args.allow_cycles,
    }
}

fn snapshot(session: &Session) -> Vec<CallFlowMenu> {
    session.store().menus().to_vec()
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(session: &Session, args: MenusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = session.store();
    let mut editor = MenuEditor::new(store.menus(), store.selected_menu());

    match args.command {
        MenusCommand::List => {
            let selected = store.selected_menu();
            let menus = editor.menus();
            let out = output::render_list(
                &global.output,
                &menus,
                |m| MenuRow {
                    selected: if selected.as_ref() == Some(&m.id) { "*" } else { "" },
                    id: m.id.to_string(),
                    name: m.name.clone(),
                    options: m.options.len(),
                    timeout: format!("{}s", m.timeout),
                    retries: m.max_retries,
                },
                |m| m.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MenusCommand::Get { menu } => {
            let m = util::find_entity(store.menus(), &menu, |m| m.name.as_str())?;
            let out = output::render_single(&global.output, &m, detail, |m| m.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MenusCommand::Add(fields) => {
            let added = editor.add_menu()?;
            let mut menu = CallFlowMenu::clone(&added);
            apply_menu_fields(&mut menu, fields)?;
            let menu = editor.update_menu(menu)?;
            store.set_selected_menu(editor.selected().cloned());
            session.persist(global.quiet)?;
            output::print_output(&menu.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ Menu '{}' added and selected", menu.name);
            }
            Ok(())
        }

        MenusCommand::Select { menu } => {
            let m = util::find_entity(store.menus(), &menu, |m| m.name.as_str())?;
            editor.select_menu(m.id.clone());
            store.set_selected_menu(Some(m.id.clone()));
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Editing menu '{}'", m.name);
            }
            Ok(())
        }

        MenusCommand::Edit(fields) => {
            let current = editor.current_menu().ok_or(CliError::NoMenuSelected)?;
            let mut menu = CallFlowMenu::clone(&current);
            apply_menu_fields(&mut menu, fields)?;
            editor.update_menu(menu)?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Menu {} updated", current.id);
            }
            Ok(())
        }

        MenusCommand::Remove { menu } => {
            let m = util::find_entity(store.menus(), &menu, |m| m.name.as_str())?;
            if !util::confirm(
                &format!("Remove menu '{}' and its {} option(s)?", m.name, m.options.len()),
                "menus remove",
                global.yes,
            )? {
                return Ok(());
            }
            editor.remove_menu(&m.id)?;
            store.set_selected_menu(editor.selected().cloned());
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Menu '{}' removed", m.name);
            }
            Ok(())
        }

        MenusCommand::AddOption(fields) => {
            let Some(option) = editor.add_option()? else {
                return Err(CliError::NoMenuSelected);
            };
            let mut option = option;
            apply_option_fields(&mut option, fields)?;
            editor.update_option(option.clone())?;
            session.persist(global.quiet)?;
            output::print_output(&option.id.to_string(), global.quiet);
            if !global.quiet {
                eprintln!("✓ Option '{}' added", option.label);
            }
            Ok(())
        }

        MenusCommand::EditOption { option, fields } => {
            let current = editor.current_menu().ok_or(CliError::NoMenuSelected)?;
            let id = EntityId::from(option.as_str());
            let mut opt = current
                .option(&id)
                .cloned()
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "option".into(),
                    identifier: option.clone(),
                    list_command: format!("menus get {}", current.id),
                })?;
            apply_option_fields(&mut opt, fields)?;
            editor.update_option(opt)?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Option {option} updated");
            }
            Ok(())
        }

        MenusCommand::RemoveOption { option } => {
            let current = editor.current_menu().ok_or(CliError::NoMenuSelected)?;
            let removed = editor
                .remove_option(&EntityId::from(option.as_str()))?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "option".into(),
                    identifier: option.clone(),
                    list_command: format!("menus get {}", current.id),
                })?;
            session.persist(global.quiet)?;
            if !global.quiet {
                eprintln!("✓ Option '{}' removed from '{}'", removed.label, current.name);
            }
            Ok(())
        }

        MenusCommand::Validate(args) => {
            let report = flow::validate_with(&snapshot(session), policy(&args));
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &report,
                |r| {
                    if r.is_clean() {
                        return output::paint("✓ Call flow is valid", Tone::Good, color);
                    }
                    r.issues
                        .iter()
                        .map(|issue| {
                            let (tag, tone) = match issue.severity {
                                flow::Severity::Error => ("error", Tone::Bad),
                                flow::Severity::Warning => ("warning", Tone::Warn),
                            };
                            format!("{}: {issue}", output::paint(tag, tone, color))
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                },
                |r| r.issues.len().to_string(),
            );
            output::print_output(&out, global.quiet);
            if report.has_errors() {
                return Err(opsdeck_core::CoreError::InvalidGraph { report }.into());
            }
            Ok(())
        }

        MenusCommand::Export { file, policy: args } => {
            let export = opsdeck_core::export_call_flow(&snapshot(session), policy(&args))?;
            if !global.quiet {
                for warning in &export.warnings {
                    eprintln!("warning: {warning}");
                }
            }
            output::write_artifact(file.as_deref(), &export.script, SCRIPT_FILE_NAME, global.quiet)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key_only(key: &str) -> OptionFields {
        OptionFields {
            key: Some(key.into()),
            label: None,
            action: None,
            target: None,
        }
    }

    #[test]
    fn option_key_accepts_dtmf_digits() {
        for key in ["0", "9", "*", "#", " 5 ", ""] {
            let mut option = MenuOption::placeholder();
            apply_option_fields(&mut option, key_only(key)).unwrap();
            assert_eq!(option.key, key.trim());
        }
    }

    #[test]
    fn option_key_rejects_anything_else() {
        for key in ["12", "a", "1#"] {
            let mut option = MenuOption::placeholder();
            let err = apply_option_fields(&mut option, key_only(key)).unwrap_err();
            assert!(matches!(err, CliError::Validation { ref field, .. } if field == "key"));
            assert!(option.key.is_empty());
        }
    }
}
