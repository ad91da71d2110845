// ── Call-flow menu editor ──
//
// Holds the "currently edited" selection and applies every change by
// replacing the whole menu record in the repository.

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::{CallFlowMenu, EntityId, MenuOption};
use crate::store::Repository;

/// Editor over an ordered menu repository.
///
/// Selection is not validated: selecting an unknown id is allowed and
/// simply leaves [`current_menu`](Self::current_menu) empty.
pub struct MenuEditor<R> {
    menus: R,
    selected: Option<EntityId>,
}

impl<R: Repository<CallFlowMenu>> MenuEditor<R> {
    pub fn new(menus: R, selected: Option<EntityId>) -> Self {
        Self { menus, selected }
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn menus(&self) -> Vec<Arc<CallFlowMenu>> {
        self.menus.list().as_ref().clone()
    }

    pub fn current_menu(&self) -> Option<Arc<CallFlowMenu>> {
        self.selected.as_ref().and_then(|id| self.menus.get(id))
    }

    pub fn select_menu(&mut self, id: EntityId) {
        tracing::debug!(%id, "menu selected");
        self.selected = Some(id);
    }

    /// Append a placeholder menu and select it.
    pub fn add_menu(&mut self) -> Result<Arc<CallFlowMenu>, CoreError> {
        let menu = self.menus.create(CallFlowMenu::placeholder())?;
        self.selected = Some(menu.id.clone());
        tracing::info!(id = %menu.id, "menu added");
        Ok(menu)
    }

    /// Append a placeholder option to the selected menu.
    ///
    /// Returns `Ok(None)` without touching anything when no valid menu
    /// is selected.
    pub fn add_option(&self) -> Result<Option<MenuOption>, CoreError> {
        let Some(current) = self.current_menu() else {
            tracing::debug!("add_option ignored: no menu selected");
            return Ok(None);
        };
        let option = MenuOption::placeholder();
        let mut menu = CallFlowMenu::clone(&current);
        menu.options.push(option.clone());
        self.menus.update(menu)?;
        Ok(Some(option))
    }

    /// Drop an option from the selected menu. Other menus are untouched,
    /// even if they hold an option with the same id.
    pub fn remove_option(&self, option_id: &EntityId) -> Result<Option<MenuOption>, CoreError> {
        let current = self.require_current()?;
        let mut menu = CallFlowMenu::clone(&current);
        let Some(pos) = menu.options.iter().position(|o| &o.id == option_id) else {
            return Ok(None);
        };
        let removed = menu.options.remove(pos);
        self.menus.update(menu)?;
        Ok(Some(removed))
    }

    /// Replace the selected menu's settings. The menu id must match the
    /// selection.
    pub fn update_menu(&self, menu: CallFlowMenu) -> Result<Arc<CallFlowMenu>, CoreError> {
        let current = self.require_current()?;
        if menu.id != current.id {
            return Err(CoreError::validation(
                "id",
                format!("menu {} is not the selected menu {}", menu.id, current.id),
            ));
        }
        self.menus.update(menu)
    }

    /// Replace one option of the selected menu, keeping its position.
    pub fn update_option(&self, option: MenuOption) -> Result<Arc<CallFlowMenu>, CoreError> {
        let current = self.require_current()?;
        let mut menu = CallFlowMenu::clone(&current);
        let slot = menu
            .options
            .iter_mut()
            .find(|o| o.id == option.id)
            .ok_or_else(|| CoreError::not_found("option", &option.id))?;
        *slot = option;
        self.menus.update(menu)
    }

    /// Delete a menu. Clears the selection when it pointed at that menu.
    pub fn remove_menu(&mut self, id: &EntityId) -> Result<Arc<CallFlowMenu>, CoreError> {
        let removed = self.menus.delete(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        tracing::info!(%id, "menu removed");
        Ok(removed)
    }

    fn require_current(&self) -> Result<Arc<CallFlowMenu>, CoreError> {
        let id = self
            .selected
            .as_ref()
            .ok_or_else(|| CoreError::validation("menu", "no menu selected"))?;
        self.menus.require(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MenuAction;
    use crate::store::{InMemoryRepository, seed};
    use pretty_assertions::assert_eq;

    fn editor() -> MenuEditor<InMemoryRepository<CallFlowMenu>> {
        MenuEditor::new(
            InMemoryRepository::with_entities(seed::menus()),
            Some(EntityId::from("1")),
        )
    }

    #[test]
    fn add_menu_appends_placeholder_and_selects_it() {
        let mut ed = editor();
        let menu = ed.add_menu().unwrap();
        assert_eq!(menu.name, "New Menu");
        assert_eq!(menu.greeting, "Please make your selection.");
        assert_eq!((menu.timeout, menu.max_retries), (10, 3));
        assert!(menu.options.is_empty());
        assert_eq!(ed.selected(), Some(&menu.id));
        assert_eq!(ed.menus().last().unwrap().id, menu.id);
    }

    #[test]
    fn add_option_appends_to_selected_menu_only() {
        let mut ed = editor();
        let second = ed.add_menu().unwrap();
        ed.select_menu(EntityId::from("1"));

        let opt = ed.add_option().unwrap().unwrap();
        assert_eq!(opt.key, "");
        assert_eq!(opt.label, "New Option");
        assert_eq!(opt.action, MenuAction::Extension);
        assert!(opt.target.is_none());

        let main = ed.current_menu().unwrap();
        assert_eq!(main.options.len(), 4);
        assert_eq!(main.options.last().unwrap().id, opt.id);
        let untouched = ed.menus().into_iter().find(|m| m.id == second.id).unwrap();
        assert!(untouched.options.is_empty());
    }

    #[test]
    fn add_option_without_selection_is_a_noop() {
        let mut ed = editor();
        ed.select_menu(EntityId::from("nope"));
        assert!(ed.current_menu().is_none());
        assert!(ed.add_option().unwrap().is_none());
        assert_eq!(ed.menus()[0].options.len(), 3);
    }

    #[test]
    fn remove_option_touches_selected_menu_only() {
        let mut ed = editor();
        ed.add_menu().unwrap();
        let shared = EntityId::from("2");
        let mut copy = ed.current_menu().unwrap().as_ref().clone();
        copy.options.push(MenuOption {
            id: shared.clone(),
            ..MenuOption::placeholder()
        });
        ed.update_menu(copy).unwrap();

        ed.select_menu(EntityId::from("1"));
        let removed = ed.remove_option(&shared).unwrap().unwrap();
        assert_eq!(removed.label, "Support");

        let menus = ed.menus();
        let keys: Vec<&str> = menus[0].options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["1", "0"]);
        assert_eq!(menus[1].options.len(), 1);
    }

    #[test]
    fn update_option_keeps_position() {
        let ed = editor();
        let mut opt = ed.current_menu().unwrap().options[1].clone();
        opt.label = "Help Desk".into();
        ed.update_option(opt).unwrap();
        assert_eq!(ed.current_menu().unwrap().options[1].label, "Help Desk");
    }

    #[test]
    fn update_menu_rejects_other_ids() {
        let ed = editor();
        let err = ed.update_menu(CallFlowMenu::placeholder()).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn remove_menu_clears_selection() {
        let mut ed = editor();
        ed.remove_menu(&EntityId::from("1")).unwrap();
        assert!(ed.selected().is_none());
        assert!(ed.menus().is_empty());
    }
}
