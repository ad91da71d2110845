// ── AGI script generator ──
//
// Renders the menu graph into a self-contained Python AGI handler. The
// graph is embedded as JSON; the handler body is a fixed template.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::model::{CallFlowMenu, MenuAction, MenuOption};

/// Marker emitted for options whose target is unset or blank.
pub const NOT_SET: &str = "<not set>";

/// Entry menu used when the graph is empty.
pub const FALLBACK_START_MENU: &str = "1";

const INDENT: &[u8] = b"        ";

const TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
Asterisk AGI IVR Script
Generated automatically by opsdeck
"""

import sys
from asterisk.agi import AGI

NOT_SET = __NOT_SET__


class IVRHandler:
    def __init__(self, agi=None):
        self.agi = agi or AGI()
        self.menus = __MENUS__

    def play_menu(self, menu_id=__START_MENU__):
        menu = next((m for m in self.menus if m['id'] == menu_id), None)
        if not menu:
            self.agi.verbose("Menu not found: " + menu_id)
            self.agi.hangup()
            return

        retries = 0
        while retries < menu['maxRetries']:
            # Play greeting
            self.agi.stream_file(f"custom/{menu['name'].lower().replace(' ', '_')}")

            # Get user input
            digit = self.agi.wait_for_digit(menu['timeout'] * 1000)

            # Find matching option; no input never matches a keyless option
            option = next((opt for opt in menu['options'] if digit and opt['key'] == digit), None)

            if option:
                self.handle_option(option)
                return

            retries += 1
            if retries < menu['maxRetries']:
                self.agi.stream_file("invalid")

        # Max retries reached
        self.agi.stream_file("goodbye")
        self.agi.hangup()

    def handle_option(self, option):
        if option['action'] != 'hangup' and option['target'] == NOT_SET:
            self.agi.verbose("Option target not set: " + option['label'])
            self.agi.hangup()
        elif option['action'] == 'extension':
            self.agi.exec_command('Dial', f"SIP/{option['target']}")
        elif option['action'] == 'queue':
            self.agi.exec_command('Queue', option['target'])
        elif option['action'] == 'menu':
            self.play_menu(option['target'])
        elif option['action'] == 'hangup':
            self.agi.hangup()

    def run(self):
        self.agi.verbose("Starting IVR")
        self.agi.answer()
        self.play_menu()


if __name__ == '__main__':
    handler = IVRHandler()
    handler.run()
"#;

// ── Embedded graph shape ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MenuView<'a> {
    id: String,
    name: &'a str,
    greeting: &'a str,
    timeout: u32,
    max_retries: u32,
    options: Vec<OptionView<'a>>,
}

#[derive(Serialize)]
struct OptionView<'a> {
    id: String,
    key: &'a str,
    label: &'a str,
    action: MenuAction,
    target: &'a str,
}

impl<'a> From<&'a CallFlowMenu> for MenuView<'a> {
    fn from(menu: &'a CallFlowMenu) -> Self {
        Self {
            id: menu.id.to_string(),
            name: &menu.name,
            greeting: &menu.greeting,
            timeout: menu.timeout,
            max_retries: menu.max_retries,
            options: menu.options.iter().map(OptionView::from).collect(),
        }
    }
}

impl<'a> From<&'a MenuOption> for OptionView<'a> {
    fn from(option: &'a MenuOption) -> Self {
        Self {
            id: option.id.to_string(),
            key: option.digit(),
            label: &option.label,
            action: option.action,
            target: option.target().unwrap_or(NOT_SET),
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Render the `ivr_handler.py` script for a menu graph.
///
/// Pure and infallible: the graph is not checked here (see
/// [`export_call_flow`](super::export_call_flow) for the validating path).
/// Menus and options appear in the order given.
pub fn generate_agi_script(menus: &[CallFlowMenu]) -> String {
    let start = menus
        .first()
        .map_or_else(|| FALLBACK_START_MENU.to_owned(), |m| m.id.to_string());

    TEMPLATE
        .replace("__NOT_SET__", &py_str(NOT_SET))
        .replace("__START_MENU__", &py_str(&start))
        .replace("__MENUS__", &embed_graph(menus))
}

/// Audio prompt a menu's greeting is played from.
pub fn greeting_prompt(menu: &CallFlowMenu) -> String {
    format!("custom/{}", menu.name.to_lowercase().replace(' ', "_"))
}

fn embed_graph(menus: &[CallFlowMenu]) -> String {
    let views: Vec<MenuView<'_>> = menus.iter().map(MenuView::from).collect();
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    if let Err(e) = views.serialize(&mut ser) {
        // Plain strings and integers into a Vec cannot fail to serialize.
        tracing::error!(error = %e, "failed to embed menu graph");
        return "[]".into();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A JSON string literal, which Python also accepts as a string literal.
fn py_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EntityId;
    use crate::store::seed;

    /// Pull the embedded graph back out of a script.
    fn embedded(script: &str) -> serde_json::Value {
        let start = script.find("self.menus = ").unwrap() + "self.menus = ".len();
        let rest = &script[start..];
        let end = rest.find("\n\n    def play_menu").unwrap();
        serde_json::from_str(&rest[..end]).unwrap()
    }

    fn menu_with(id: &str, n_options: usize) -> CallFlowMenu {
        CallFlowMenu {
            id: EntityId::from(id),
            name: format!("Menu {id}"),
            options: (0..n_options)
                .map(|k| MenuOption {
                    key: k.to_string(),
                    target: Some(format!("10{k}")),
                    ..MenuOption::placeholder()
                })
                .collect(),
            ..CallFlowMenu::placeholder()
        }
    }

    #[test]
    fn main_menu_options_in_insertion_order() {
        let script = generate_agi_script(&seed::menus());
        let graph = embedded(&script);
        let options = graph[0]["options"].as_array().unwrap();
        let pairs: Vec<(&str, &str)> = options
            .iter()
            .map(|o| (o["key"].as_str().unwrap(), o["target"].as_str().unwrap()))
            .collect();
        assert_eq!(pairs, [("1", "1001"), ("2", "support"), ("0", "1000")]);
        assert_eq!(graph[0]["maxRetries"], 3);
        assert!(script.contains(r#"self.agi.exec_command('Dial', f"SIP/{option['target']}")"#));
        assert!(script.contains(r#"def play_menu(self, menu_id="1"):"#));
    }

    #[test]
    fn graph_shape_matches_menus() {
        let menus = vec![menu_with("a", 2), menu_with("b", 0), menu_with("c", 5)];
        let graph = embedded(&generate_agi_script(&menus));
        let counts: Vec<usize> = graph
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["options"].as_array().unwrap().len())
            .collect();
        assert_eq!(counts, [2, 0, 5]);
    }

    #[test]
    fn unset_target_uses_marker() {
        let mut menu = menu_with("a", 1);
        menu.options[0].target = Some(String::new());
        let script = generate_agi_script(&[menu]);
        assert_eq!(embedded(&script)[0]["options"][0]["target"], NOT_SET);
        assert!(!script.contains(r#""target": """#));
        assert!(script.contains("Option target not set: "));
    }

    #[test]
    fn no_input_retries_instead_of_matching_keyless_option() {
        let mut menu = menu_with("a", 1);
        menu.options[0].key = String::new();
        let script = generate_agi_script(&[menu]);
        assert_eq!(embedded(&script)[0]["options"][0]["key"], "");
        assert!(script.contains("if digit and opt['key'] == digit"));
        assert!(!script.contains("if opt['key'] == digit"));
    }

    #[test]
    fn keys_are_emitted_as_dialled() {
        let mut menu = menu_with("a", 2);
        menu.options[0].key = " 1".into();
        menu.options[1].key = "1".into();
        let graph = embedded(&generate_agi_script(std::slice::from_ref(&menu)));
        assert_eq!(graph[0]["options"][0]["key"], "1");

        // Both options answer the same digit, so validation flags them.
        let report = crate::flow::validate(&[menu]);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn empty_graph_starts_at_fallback() {
        let script = generate_agi_script(&[]);
        assert!(script.contains("self.menus = []"));
        assert!(script.contains(r#"menu_id="1""#));
    }

    #[test]
    fn uses_eight_space_indent() {
        let script = generate_agi_script(&seed::menus());
        assert!(script.contains("\n        {\n                \"id\": \"1\",\n"));
    }

    #[test]
    fn prompt_name_is_snake_cased() {
        assert_eq!(greeting_prompt(&seed::menus()[0]), "custom/main_menu");
    }
}
