// ── IVR call-flow domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

/// What happens when the caller presses an option's digit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MenuAction {
    /// Jump to another call-flow menu (target = menu id).
    Menu,
    /// Dial an extension (target = extension number).
    Extension,
    /// Terminate the call.
    Hangup,
    /// Enqueue the caller (target = queue name).
    Queue,
}

/// One digit-keyed edge out of a call-flow menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub id: EntityId,
    /// Single input digit. May be empty while the option is being edited.
    pub key: String,
    pub label: String,
    pub action: MenuAction,
    pub target: Option<String>,
}

impl MenuOption {
    /// Placeholder option appended by the editor.
    pub fn placeholder() -> Self {
        Self {
            id: EntityId::generate(),
            key: String::new(),
            label: "New Option".into(),
            action: MenuAction::Extension,
            target: None,
        }
    }

    /// The digit as dialled: surrounding whitespace never reaches the caller.
    pub fn digit(&self) -> &str {
        self.key.trim()
    }

    /// The target, treating whitespace-only values as unset.
    pub fn target(&self) -> Option<&str> {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// A node of the IVR graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFlowMenu {
    pub id: EntityId,
    pub name: String,
    pub greeting: String,
    /// Seconds to wait for a digit.
    pub timeout: u32,
    pub max_retries: u32,
    pub options: Vec<MenuOption>,
}

impl CallFlowMenu {
    /// Placeholder menu appended by the editor.
    pub fn placeholder() -> Self {
        Self {
            id: EntityId::generate(),
            name: "New Menu".into(),
            greeting: "Please make your selection.".into(),
            timeout: 10,
            max_retries: 3,
            options: Vec::new(),
        }
    }

    pub fn option(&self, id: &EntityId) -> Option<&MenuOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Ids of the menus this menu links to, in option order.
    pub fn submenu_targets(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|o| o.action == MenuAction::Menu)
            .filter_map(MenuOption::target)
    }
}
