//! UI Feedback Surface
//!
//! Transient feedback elements: toast notifications and modal dialogs,
//! plus the top-level shell views the application toggles between.

pub mod modal;
pub mod notify;

pub use modal::{Modal, ModalAction, ModalOutcome};
pub use notify::{close_button_id, Notification, NotificationCenter, NotificationKind, Visibility};

/// Top-level containers of the application shell. Exactly one is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellView {
    Splash,
    RoleSelection,
    Auth,
    Dashboard,
}

impl ShellView {
    /// DOM id of the container backing this view
    pub fn container_id(&self) -> &'static str {
        match self {
            ShellView::Splash => "splash-screen",
            ShellView::RoleSelection => "role-selection",
            ShellView::Auth => "auth-container",
            ShellView::Dashboard => "dashboard-container",
        }
    }
}
