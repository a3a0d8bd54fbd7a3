//! Content surface
//!
//! The surface owns the rendered element tree. Replacing a container's
//! content discards every element (and listener binding) that lived inside
//! it, then registers the elements and bindings of the new content.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use crate::dashboard::{Action, Binding};
use crate::ui::ShellView;

pub trait ContentSurface: Send + Sync {
    /// Swap the content of `container_id`. Returns false, changing nothing,
    /// when the container does not exist.
    fn replace(&self, container_id: &str, html: &str, bindings: Vec<Binding>) -> bool;

    fn contains(&self, element_id: &str) -> bool;

    fn content(&self, container_id: &str) -> Option<String>;

    /// Action bound to a live element
    fn action_for(&self, element_id: &str) -> Option<Action>;

    fn field_value(&self, element_id: &str) -> Option<String>;

    /// Set an input value. Ignored for elements that don't exist.
    fn set_field(&self, element_id: &str, value: &str);

    /// Show one top-level container and hide the others
    fn show_view(&self, view: ShellView);

    fn visible_view(&self) -> Option<ShellView>;
}

#[derive(Debug, Default)]
struct Element {
    parent: Option<String>,
    html: String,
    bindings: Vec<Binding>,
}

#[derive(Debug, Default)]
struct Tree {
    elements: HashMap<String, Element>,
    fields: HashMap<String, String>,
    visible: Option<ShellView>,
}

impl Tree {
    fn remove_children(&mut self, parent: &str) {
        let children: Vec<String> = self
            .elements
            .iter()
            .filter(|(_, el)| el.parent.as_deref() == Some(parent))
            .map(|(id, _)| id.clone())
            .collect();

        for child in children {
            self.remove_children(&child);
            self.elements.remove(&child);
            self.fields.remove(&child);
        }
    }
}

/// `id="..."` attributes of rendered markup
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sid="([^"]+)""#).expect("id regex must compile"));

/// In-memory surface used by the shell server and tests
#[derive(Debug, Default)]
pub struct MemorySurface {
    tree: Mutex<Tree>,
}

impl MemorySurface {
    /// Surface with the four shell containers plus the notification and modal areas
    pub fn new() -> Self {
        let surface = Self::empty();
        for view in [
            ShellView::Splash,
            ShellView::RoleSelection,
            ShellView::Auth,
            ShellView::Dashboard,
        ] {
            surface.add_container(view.container_id(), None);
        }
        surface.add_container("notification-area", None);
        surface.add_container("modal-area", None);
        surface
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_container(&self, id: &str, parent: Option<&str>) {
        self.tree
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elements
            .insert(
                id.to_string(),
                Element {
                    parent: parent.map(str::to_string),
                    ..Element::default()
                },
            );
    }

    pub fn bindings(&self) -> Vec<Binding> {
        let tree = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        tree.elements
            .values()
            .flat_map(|el| el.bindings.iter().cloned())
            .collect()
    }
}

impl ContentSurface for MemorySurface {
    fn replace(&self, container_id: &str, html: &str, bindings: Vec<Binding>) -> bool {
        let mut tree = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        if !tree.elements.contains_key(container_id) {
            return false;
        }

        tree.remove_children(container_id);

        for capture in ID_RE.captures_iter(html) {
            let id = &capture[1];
            if id == container_id {
                continue;
            }
            tree.elements.insert(
                id.to_string(),
                Element {
                    parent: Some(container_id.to_string()),
                    ..Element::default()
                },
            );
            tree.fields.remove(id);
        }

        if let Some(container) = tree.elements.get_mut(container_id) {
            container.html = html.to_string();
            container.bindings = bindings;
        }
        true
    }

    fn contains(&self, element_id: &str) -> bool {
        self.tree
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elements
            .contains_key(element_id)
    }

    fn content(&self, container_id: &str) -> Option<String> {
        self.tree
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elements
            .get(container_id)
            .map(|el| el.html.clone())
    }

    fn action_for(&self, element_id: &str) -> Option<Action> {
        let tree = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        if !tree.elements.contains_key(element_id) {
            return None;
        }
        tree.elements
            .values()
            .flat_map(|el| el.bindings.iter())
            .find(|b| b.element_id == element_id)
            .map(|b| b.action.clone())
    }

    fn field_value(&self, element_id: &str) -> Option<String> {
        self.tree
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fields
            .get(element_id)
            .cloned()
    }

    fn set_field(&self, element_id: &str, value: &str) {
        let mut tree = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        if tree.elements.contains_key(element_id) {
            tree.fields.insert(element_id.to_string(), value.to_string());
        }
    }

    fn show_view(&self, view: ShellView) {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner).visible = Some(view);
    }

    fn visible_view(&self) -> Option<ShellView> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner).visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_missing_container() {
        let surface = MemorySurface::empty();
        assert!(!surface.replace("dashboard-content", "<p>x</p>", vec![]));
        assert!(!surface.contains("dashboard-content"));
    }

    #[test]
    fn test_replace_registers_new_elements() {
        let surface = MemorySurface::new();
        let html = r#"<input id="chemical-name"><button id="submit-chemical-btn">Go</button>"#;
        assert!(surface.replace(
            "dashboard-container",
            html,
            vec![Binding::new("submit-chemical-btn", Action::SubmitRegistration)],
        ));

        assert!(surface.contains("chemical-name"));
        assert_eq!(
            surface.action_for("submit-chemical-btn"),
            Some(Action::SubmitRegistration)
        );

        surface.set_field("chemical-name", "Acetone");
        assert_eq!(surface.field_value("chemical-name").as_deref(), Some("Acetone"));
        surface.set_field("not-rendered", "x");
        assert_eq!(surface.field_value("not-rendered"), None);
    }

    #[test]
    fn test_replace_discards_old_subtree() {
        let surface = MemorySurface::new();
        surface.replace(
            "dashboard-container",
            r#"<div id="dashboard-content"><input id="verify-rfid-input"></div>"#,
            vec![],
        );
        surface.replace(
            "dashboard-content",
            r#"<input id="verify-rfid-input"><button id="verify-submit-btn"></button>"#,
            vec![Binding::new("verify-submit-btn", Action::VerifyLookup)],
        );
        surface.set_field("verify-rfid-input", "RFID-1");

        surface.replace("dashboard-container", r#"<p id="other">x</p>"#, vec![]);

        assert!(!surface.contains("dashboard-content"));
        assert!(!surface.contains("verify-submit-btn"));
        assert_eq!(surface.action_for("verify-submit-btn"), None);
        assert_eq!(surface.field_value("verify-rfid-input"), None);
        assert!(surface.bindings().is_empty());
    }

    #[test]
    fn test_show_view() {
        let surface = MemorySurface::new();
        assert_eq!(surface.visible_view(), None);
        surface.show_view(ShellView::Auth);
        assert_eq!(surface.visible_view(), Some(ShellView::Auth));
    }
}
