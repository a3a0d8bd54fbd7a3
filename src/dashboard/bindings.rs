//! Listener bindings declared by rendered fragments
//!
//! Each fragment comes with the list of element ids that react to clicks or
//! submits. The navigation surface swaps the list together with the HTML.

use uuid::Uuid;

use crate::session::Role;
use crate::ui::ModalAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    GoBack,
    Logout,
    ToggleUserMenu,
    RefreshStatus,
    SubmitRegistration,
    SubmitMovement,
    ScanTag,
    FindChemical,
    UpdateLocation,
    VerifyOnChain,
    VerifyLookup,
    LoadHistory,
    SelectRole(Role),
    SubmitLogin,
    SubmitSignup,
    Modal(ModalAction),
    DismissNotification(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub element_id: String,
    pub action: Action,
}

impl Binding {
    pub fn new(element_id: impl Into<String>, action: Action) -> Self {
        Self {
            element_id: element_id.into(),
            action,
        }
    }
}

/// Quick action button ids and the page each one opens
pub const QUICK_ACTIONS: [(&str, &str); 3] = [
    ("register-chemical-btn", "register"),
    ("scan-rfid-btn", "scan"),
    ("verify-chemical-btn", "verify"),
];

fn quick_action_for(role: Option<Role>) -> Option<(&'static str, &'static str)> {
    match role? {
        Role::Manufacturer => Some(QUICK_ACTIONS[0]),
        Role::Distributor => Some(QUICK_ACTIONS[1]),
        Role::Customer => Some(QUICK_ACTIONS[2]),
        Role::Admin | Role::Retailer => None,
    }
}

/// Bindings for the page content rendered by [`super::page_content`]
pub fn bindings_for(page: &str, role: Option<Role>) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let back = || Binding::new("back-to-dashboard-btn", Action::GoBack);

    match page {
        "dashboard" | "overview" => {
            if let Some((id, target)) = quick_action_for(role) {
                bindings.push(Binding::new(id, Action::Navigate(target.to_string())));
            }
        }
        "blockchain" => {
            bindings.push(Binding::new("refresh-blockchain-btn", Action::RefreshStatus));
        }
        "register" => {
            bindings.push(Binding::new("submit-chemical-btn", Action::SubmitRegistration));
            bindings.push(back());
        }
        "track" => {
            bindings.push(Binding::new("submit-movement-btn", Action::SubmitMovement));
            bindings.push(Binding::new("scan-tag-btn", Action::ScanTag));
            bindings.push(back());
        }
        "scan" => {
            bindings.push(Binding::new("find-chemical-btn", Action::FindChemical));
            bindings.push(Binding::new("update-location-btn", Action::UpdateLocation));
            bindings.push(Binding::new("verify-blockchain-btn", Action::VerifyOnChain));
            bindings.push(back());
        }
        "verify" => {
            bindings.push(Binding::new("verify-submit-btn", Action::VerifyLookup));
            bindings.push(back());
        }
        "history" => {
            bindings.push(Binding::new("history-load-btn", Action::LoadHistory));
            bindings.push(back());
        }
        _ => {}
    }

    bindings
}

/// Sidebar links, user menu and logout of the dashboard frame
pub fn shell_bindings(role: Option<Role>) -> Vec<Binding> {
    let mut bindings: Vec<Binding> = super::shell::menu_entries(role)
        .into_iter()
        .map(|entry| {
            Binding::new(
                format!("nav-{}", entry.page),
                Action::Navigate(entry.page.to_string()),
            )
        })
        .collect();

    bindings.push(Binding::new("user-dropdown-toggle", Action::ToggleUserMenu));
    bindings.push(Binding::new("logout-btn", Action::Logout));
    bindings
}

/// Role cards of the role-selection screen
pub fn role_selection_bindings() -> Vec<Binding> {
    Role::ALL
        .iter()
        .map(|role| Binding::new(format!("role-card-{}", role), Action::SelectRole(*role)))
        .collect()
}

pub fn auth_bindings() -> Vec<Binding> {
    vec![
        Binding::new("login-btn", Action::SubmitLogin),
        Binding::new("signup-btn", Action::SubmitSignup),
    ]
}

/// Buttons of the open modal dialog
pub fn modal_bindings() -> Vec<Binding> {
    vec![
        Binding::new("modal-confirm", Action::Modal(ModalAction::ConfirmButton)),
        Binding::new("modal-cancel", Action::Modal(ModalAction::CancelButton)),
        Binding::new("modal-close", Action::Modal(ModalAction::CloseButton)),
        Binding::new("modal-backdrop", Action::Modal(ModalAction::OutsideClick)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_action_per_role() {
        let manufacturer = bindings_for("dashboard", Some(Role::Manufacturer));
        assert_eq!(
            manufacturer,
            vec![Binding::new("register-chemical-btn", Action::Navigate("register".into()))]
        );

        let distributor = bindings_for("overview", Some(Role::Distributor));
        assert_eq!(distributor[0].action, Action::Navigate("scan".into()));

        assert!(bindings_for("dashboard", Some(Role::Admin)).is_empty());
        assert!(bindings_for("dashboard", None).is_empty());
    }

    #[test]
    fn test_form_pages_bind_back_button() {
        for page in ["register", "track", "scan", "verify", "history"] {
            assert!(bindings_for(page, Some(Role::Admin))
                .iter()
                .any(|b| b.action == Action::GoBack));
        }
        assert!(bindings_for("settings", Some(Role::Admin)).is_empty());
    }

    #[test]
    fn test_shell_bindings_include_logout() {
        let bindings = shell_bindings(Some(Role::Customer));
        assert!(bindings.iter().any(|b| b.element_id == "logout-btn"));
        assert!(bindings.iter().any(|b| b.element_id == "nav-verify"));
        assert!(bindings.iter().any(|b| b.element_id == "nav-dashboard"));
    }
}
