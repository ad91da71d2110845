// ── Call-flow graph validation ──
//
// Eager checks run before a script is generated. Errors block export;
// warnings are reported alongside the artifact.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{CallFlowMenu, EntityId, MenuAction, MenuOption};

/// Knobs for [`validate_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Accept cycles through `menu` options (e.g. "back to main menu").
    /// Off by default: the generated handler recurses on every hop.
    pub allow_cycles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding, located by menu (and option where relevant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// A `menu` option with no target.
    MissingTarget { menu: EntityId, option: EntityId },
    /// A `menu` option naming a menu that does not exist.
    DanglingTarget {
        menu: EntityId,
        option: EntityId,
        target: String,
    },
    /// Menus that reach each other through `menu` options, in walk order.
    Cycle { path: Vec<EntityId> },
    /// Two options of one menu listen for the same digit.
    DuplicateKey { menu: EntityId, key: String },
    /// An option with no digit assigned.
    EmptyKey { menu: EntityId, option: EntityId },
    /// An extension or queue option with no target.
    UnsetTarget { menu: EntityId, option: EntityId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::MissingTarget { menu, option } => {
                write!(f, "menu {menu}: option {option} jumps to a menu but has no target")
            }
            IssueKind::DanglingTarget {
                menu,
                option,
                target,
            } => write!(f, "menu {menu}: option {option} targets unknown menu '{target}'"),
            IssueKind::Cycle { path } => {
                let hops: Vec<String> = path.iter().map(ToString::to_string).collect();
                let first = hops.first().cloned().unwrap_or_default();
                write!(f, "menu cycle: {} -> {first}", hops.join(" -> "))
            }
            IssueKind::DuplicateKey { menu, key } => {
                write!(f, "menu {menu}: more than one option uses key '{key}'")
            }
            IssueKind::EmptyKey { menu, option } => {
                write!(f, "menu {menu}: option {option} has no key")
            }
            IssueKind::UnsetTarget { menu, option } => {
                write!(f, "menu {menu}: option {option} has no target and will hang up")
            }
        }
    }
}

/// Everything found in one pass over the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, severity: Severity, kind: IssueKind) {
        self.issues.push(Issue { severity, kind });
    }
}

/// Validate with the default policy (cycles rejected).
pub fn validate(menus: &[CallFlowMenu]) -> ValidationReport {
    validate_with(menus, ValidationPolicy::default())
}

pub fn validate_with(menus: &[CallFlowMenu], policy: ValidationPolicy) -> ValidationReport {
    let mut report = ValidationReport::default();

    // Targets are matched on the id's string form, the same comparison the
    // generated handler makes at runtime.
    let mut index: IndexMap<String, usize> = IndexMap::with_capacity(menus.len());
    for (i, menu) in menus.iter().enumerate() {
        index.entry(menu.id.to_string()).or_insert(i);
    }

    for menu in menus {
        check_options(menu, &index, &mut report);
    }

    let cycle_severity = if policy.allow_cycles {
        Severity::Warning
    } else {
        Severity::Error
    };
    for path in find_cycles(menus, &index) {
        report.push(cycle_severity, IssueKind::Cycle { path });
    }

    tracing::debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "call flow validated"
    );
    report
}

fn check_options(
    menu: &CallFlowMenu,
    index: &IndexMap<String, usize>,
    report: &mut ValidationReport,
) {
    let mut seen_keys: HashSet<&str> = HashSet::new();
    let mut duplicate_keys: Vec<&str> = Vec::new();

    for option in &menu.options {
        let key = option.digit();
        if key.is_empty() {
            report.push(Severity::Warning, IssueKind::EmptyKey {
                menu: menu.id.clone(),
                option: option.id.clone(),
            });
        } else if !seen_keys.insert(key) && !duplicate_keys.contains(&key) {
            duplicate_keys.push(key);
        }

        check_target(menu, option, index, report);
    }

    for key in duplicate_keys {
        report.push(Severity::Warning, IssueKind::DuplicateKey {
            menu: menu.id.clone(),
            key: key.to_owned(),
        });
    }
}

fn check_target(
    menu: &CallFlowMenu,
    option: &MenuOption,
    index: &IndexMap<String, usize>,
    report: &mut ValidationReport,
) {
    match (option.action, option.target()) {
        (MenuAction::Menu, None) => report.push(Severity::Error, IssueKind::MissingTarget {
            menu: menu.id.clone(),
            option: option.id.clone(),
        }),
        (MenuAction::Menu, Some(target)) if !index.contains_key(target) => {
            report.push(Severity::Error, IssueKind::DanglingTarget {
                menu: menu.id.clone(),
                option: option.id.clone(),
                target: target.to_owned(),
            });
        }
        (MenuAction::Extension | MenuAction::Queue, None) => {
            report.push(Severity::Warning, IssueKind::UnsetTarget {
                menu: menu.id.clone(),
                option: option.id.clone(),
            });
        }
        _ => {}
    }
}

// ── Cycle detection ─────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Depth-first search over `menu` edges. Each distinct cycle is returned
/// once, rotated to start at the menu that appears first.
fn find_cycles(menus: &[CallFlowMenu], index: &IndexMap<String, usize>) -> Vec<Vec<EntityId>> {
    let edges: Vec<Vec<usize>> = menus
        .iter()
        .map(|m| {
            m.submenu_targets()
                .filter_map(|t| index.get(t).copied())
                .collect()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; menus.len()];
    let mut path = Vec::new();
    let mut found: Vec<Vec<usize>> = Vec::new();

    for start in 0..menus.len() {
        if marks[start] == Mark::Unvisited {
            visit(start, &edges, &mut marks, &mut path, &mut found);
        }
    }

    found
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|i| menus[i].id.clone()).collect())
        .collect()
}

fn visit(
    node: usize,
    edges: &[Vec<usize>],
    marks: &mut [Mark],
    path: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    marks[node] = Mark::OnPath;
    path.push(node);

    for &next in &edges[node] {
        match marks[next] {
            Mark::Unvisited => visit(next, edges, marks, path, found),
            Mark::OnPath => {
                if let Some(pos) = path.iter().position(|&n| n == next) {
                    let cycle = canonical(&path[pos..]);
                    if !found.contains(&cycle) {
                        found.push(cycle);
                    }
                }
            }
            Mark::Done => {}
        }
    }

    path.pop();
    marks[node] = Mark::Done;
}

/// Rotate so the lowest index (earliest menu) leads.
fn canonical(cycle: &[usize]) -> Vec<usize> {
    let lead = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, n)| n)
        .map_or(0, |(i, _)| i);
    cycle[lead..].iter().chain(&cycle[..lead]).copied().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::seed;
    use pretty_assertions::assert_eq;

    fn menu(id: &str, options: Vec<MenuOption>) -> CallFlowMenu {
        CallFlowMenu {
            id: EntityId::from(id),
            name: format!("Menu {id}"),
            options,
            ..CallFlowMenu::placeholder()
        }
    }

    fn opt(id: &str, key: &str, action: MenuAction, target: Option<&str>) -> MenuOption {
        MenuOption {
            id: EntityId::from(id),
            key: key.into(),
            label: format!("Option {id}"),
            action,
            target: target.map(Into::into),
        }
    }

    fn kinds(report: &ValidationReport) -> Vec<&IssueKind> {
        report.issues.iter().map(|i| &i.kind).collect()
    }

    #[test]
    fn seed_graph_is_clean() {
        assert!(validate(&seed::menus()).is_clean());
    }

    #[test]
    fn empty_graph_is_clean() {
        assert!(validate(&[]).is_clean());
    }

    #[test]
    fn dangling_and_missing_targets_are_errors() {
        let menus = vec![menu("main", vec![
            opt("a", "1", MenuAction::Menu, Some("sales")),
            opt("b", "2", MenuAction::Menu, None),
        ])];
        let report = validate(&menus);
        assert_eq!(report.errors().count(), 2);
        assert_eq!(kinds(&report), vec![
            &IssueKind::DanglingTarget {
                menu: EntityId::from("main"),
                option: EntityId::from("a"),
                target: "sales".into(),
            },
            &IssueKind::MissingTarget {
                menu: EntityId::from("main"),
                option: EntityId::from("b"),
            },
        ]);
    }

    #[test]
    fn key_problems_are_warnings() {
        let menus = vec![menu("main", vec![
            opt("a", "1", MenuAction::Extension, Some("1001")),
            opt("b", "1", MenuAction::Extension, Some("1002")),
            opt("c", "1", MenuAction::Hangup, None),
            opt("d", "", MenuAction::Queue, None),
        ])];
        let report = validate(&menus);
        assert!(!report.has_errors());
        assert_eq!(kinds(&report), vec![
            &IssueKind::EmptyKey {
                menu: EntityId::from("main"),
                option: EntityId::from("d"),
            },
            &IssueKind::UnsetTarget {
                menu: EntityId::from("main"),
                option: EntityId::from("d"),
            },
            &IssueKind::DuplicateKey {
                menu: EntityId::from("main"),
                key: "1".into(),
            },
        ]);
    }

    #[test]
    fn cycle_reported_once() {
        let menus = vec![
            menu("a", vec![opt("1", "1", MenuAction::Menu, Some("b"))]),
            menu("b", vec![opt("2", "1", MenuAction::Menu, Some("c"))]),
            menu("c", vec![
                opt("3", "1", MenuAction::Menu, Some("a")),
                opt("4", "2", MenuAction::Menu, Some("b")),
            ]),
        ];
        let report = validate(&menus);
        let cycles: Vec<_> = report
            .errors()
            .filter_map(|i| match &i.kind {
                IssueKind::Cycle { path } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(cycles, vec![
            vec![EntityId::from("a"), EntityId::from("b"), EntityId::from("c")],
            vec![EntityId::from("b"), EntityId::from("c")],
        ]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let menus = vec![menu("a", vec![opt("1", "9", MenuAction::Menu, Some("a"))])];
        let report = validate(&menus);
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.issues[0].to_string(), "menu cycle: a -> a");
    }

    #[test]
    fn policy_can_downgrade_cycles() {
        let menus = vec![
            menu("a", vec![opt("1", "1", MenuAction::Menu, Some("b"))]),
            menu("b", vec![opt("2", "0", MenuAction::Menu, Some("a"))]),
        ];
        let strict = validate(&menus);
        assert!(strict.has_errors());

        let lenient = validate_with(&menus, ValidationPolicy { allow_cycles: true });
        assert!(!lenient.has_errors());
        assert_eq!(lenient.warnings().count(), 1);
    }
}
