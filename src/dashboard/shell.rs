//! Application shell: splash, role selection, auth forms and the dashboard
//! frame (sidebar, header, breadcrumb).

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::fragments::connection_badge;
use super::page_title;
use crate::blockchain::ConnectionStatus;
use crate::session::{Role, Session};
use crate::ui::ShellView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub page: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

const fn entry(page: &'static str, label: &'static str, icon: &'static str) -> MenuEntry {
    MenuEntry { page, label, icon }
}

fn role_menu(role: Option<Role>) -> &'static [MenuEntry] {
    const ADMIN: [MenuEntry; 3] = [
        entry("users", "User Management", "fas fa-users"),
        entry("audit", "Audit Logs", "fas fa-clipboard-list"),
        entry("chemicals", "All Chemicals", "fas fa-flask"),
    ];
    const MANUFACTURER: [MenuEntry; 3] = [
        entry("register", "Register Chemical", "fas fa-plus-circle"),
        entry("inventory", "Inventory", "fas fa-boxes"),
        entry("shipments", "Shipments", "fas fa-truck-loading"),
    ];
    const DISTRIBUTOR: [MenuEntry; 3] = [
        entry("track", "Track Movement", "fas fa-map-marker-alt"),
        entry("scan", "Scan RFID", "fas fa-qrcode"),
        entry("transfers", "Transfers", "fas fa-exchange-alt"),
    ];
    const CUSTOMER: [MenuEntry; 3] = [
        entry("verify", "Verify Chemical", "fas fa-check-circle"),
        entry("history", "Movement History", "fas fa-history"),
        entry("inventory", "My Inventory", "fas fa-boxes"),
    ];

    match role {
        Some(Role::Admin) => &ADMIN,
        Some(Role::Manufacturer) => &MANUFACTURER,
        Some(Role::Distributor) => &DISTRIBUTOR,
        Some(Role::Customer) => &CUSTOMER,
        Some(Role::Retailer) | None => &[],
    }
}

/// Sidebar entries in display order: Dashboard, role entries, Blockchain Status, Settings
pub fn menu_entries(role: Option<Role>) -> Vec<MenuEntry> {
    let mut entries = vec![entry("dashboard", "Dashboard", "fas fa-tachometer-alt")];
    entries.extend_from_slice(role_menu(role));
    entries.push(entry("blockchain", "Blockchain Status", "fas fa-link"));
    entries.push(entry("settings", "Settings", "fas fa-cog"));
    entries
}

fn role_title(role: Option<Role>) -> &'static str {
    role.map(|r| r.title()).unwrap_or("User")
}

pub fn sidebar(role: Option<Role>, active: &str) -> Markup {
    let active = if active == "overview" { "dashboard" } else { active };
    html! {
        div class="dashboard-sidebar" id="dashboard-sidebar" {
            div class="dashboard-logo" {
                div class="dashboard-logo-text" {
                    h3 { "ChemTrack" }
                    p { "Chemical Traceability" }
                }
            }
            ul class="sidebar-menu" {
                @for item in menu_entries(role) {
                    @if item.page == "blockchain" {
                        div class="sidebar-divider" {}
                    }
                    @let class = if item.page == active { "sidebar-link active" } else { "sidebar-link" };
                    li class="sidebar-item" {
                        a href=(format!("#{}", item.page)) class=(class) id=(format!("nav-{}", item.page)) data-page=(item.page) {
                            span class="sidebar-icon" { i class=(item.icon) {} }
                            " " (item.label)
                        }
                    }
                }
            }
            div class="sidebar-footer" { "© 2025 ChemTrack System" }
        }
    }
}

pub fn breadcrumb(role: Option<Role>, title: &str) -> Markup {
    html! {
        ul class="breadcrumb" {
            li class="breadcrumb-item" { "ChemTrack" }
            li class="breadcrumb-item" { (role_title(role)) " Portal" }
            li class="breadcrumb-item current" { (title) }
        }
    }
}

pub fn header(
    role: Option<Role>,
    session: Option<&Session>,
    status: &ConnectionStatus,
    title: &str,
) -> Markup {
    let name = session.map(|s| s.display_name().to_string()).unwrap_or_else(|| "User".to_string());
    let initial = session.map(|s| s.initial()).unwrap_or_else(|| "U".to_string());

    html! {
        div class="dashboard-header" {
            div class="page-title" {
                h1 { (title) }
                (breadcrumb(role, title))
            }
            div class="header-actions" {
                div id="blockchain-status-slot" {
                    (connection_badge(status))
                }
                div class="user-dropdown" id="user-dropdown" {
                    button class="user-dropdown-toggle" id="user-dropdown-toggle" {
                        div class="user-avatar" { (initial) }
                        div class="user-info" {
                            div class="user-name" { (name) }
                            div class="user-role" { (role_title(role)) }
                        }
                        i class="fas fa-chevron-down chevron-icon" {}
                    }
                    div class="user-dropdown-menu" {
                        a href="#profile" class="dropdown-item" { i class="fas fa-user" {} " Profile" }
                        a href="#settings" class="dropdown-item" { i class="fas fa-cog" {} " Settings" }
                        div class="dropdown-divider" {}
                        a href="#logout" class="dropdown-item" id="logout-btn" {
                            i class="fas fa-sign-out-alt" {} " Logout"
                        }
                    }
                }
            }
        }
    }
}

/// Sidebar + header around already rendered page content
pub fn dashboard_frame(
    role: Option<Role>,
    session: Option<&Session>,
    status: &ConnectionStatus,
    page: &str,
    content_html: &str,
) -> String {
    let title = page_title(page);
    html! {
        (sidebar(role, page))
        div class="dashboard-main" {
            (header(role, session, status, &title))
            div class="dashboard-content" id="dashboard-content" {
                (PreEscaped(content_html))
            }
        }
    }
    .into_string()
}

pub fn role_selection() -> String {
    html! {
        div class="role-selection-inner" {
            h2 { "Select Your Role" }
            p { "Choose how you will use ChemTrack." }
            div class="role-cards" {
                @for role in Role::ALL {
                    div class="role-card" id=(format!("role-card-{}", role)) data-role=(role.as_str()) {
                        div class="role-icon" { i class=(role.icon()) {} }
                        h3 { (role.label()) }
                        p { (role.description()) }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Login and signup forms, with the selected role's sidebar
pub fn auth_view(role: Option<Role>) -> String {
    html! {
        div class="auth-sidebar" id="auth-sidebar" {
            div id="role-info" {
                @if let Some(role) = role {
                    div class="role-name" {
                        div class="role-name-icon" { i class=(role.icon()) {} }
                        h3 { (role.label()) }
                    }
                    div class="role-description" { (role.description()) }
                }
            }
        }
        div class="auth-forms" {
            form class="auth-form active" id="login-form" {
                div class="form-group" {
                    label for="login-email" { "Email" }
                    input type="email" id="login-email" class="form-control" required;
                }
                div class="form-group" {
                    label for="login-password" { "Password" }
                    input type="password" id="login-password" class="form-control" required;
                }
                button type="button" id="login-btn" class="action-btn" { "Sign In" }
                div id="login-error" class="form-error" {}
            }
            form class="auth-form" id="signup-form" {
                div class="form-group" {
                    label for="signup-name" { "Full Name" }
                    input type="text" id="signup-name" class="form-control" required;
                }
                div class="form-group" {
                    label for="signup-email" { "Email" }
                    input type="email" id="signup-email" class="form-control" required;
                }
                div class="form-group" {
                    label for="signup-password" { "Password" }
                    input type="password" id="signup-password" class="form-control" minlength="8" required;
                }
                div class="form-group" {
                    label for="signup-confirm" { "Confirm Password" }
                    input type="password" id="signup-confirm" class="form-control" required;
                }
                div class="form-group" {
                    label for="signup-role" { "Role" }
                    input type="text" id="signup-role" class="form-control" readonly
                        value=(role.map(|r| r.title()).unwrap_or(""));
                }
                button type="button" id="signup-btn" class="action-btn" { "Create Account" }
                div id="signup-error" class="form-error" {}
            }
        }
    }
    .into_string()
}

/// Full document. Only the container for `visible` is displayed.
pub fn app_document(visible: ShellView, body_for: impl Fn(ShellView) -> String) -> String {
    let views = [
        ShellView::Splash,
        ShellView::RoleSelection,
        ShellView::Auth,
        ShellView::Dashboard,
    ];
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "ChemTrack - Chemical Traceability" }
                link rel="stylesheet" href="/static/styles.css";
            }
            body {
                @for view in views {
                    @let style = if view == visible { "display: block" } else { "display: none" };
                    div id=(view.container_id()) style=(style) {
                        (PreEscaped(body_for(view)))
                    }
                }
                div id="notification-area" {}
                div id="modal-area" {}
            }
        }
    }
    .into_string()
}

pub fn splash() -> String {
    html! {
        div class="splash-content" {
            h1 { "ChemTrack" }
            p { "Blockchain-powered chemical traceability" }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_order() {
        let pages: Vec<_> = menu_entries(Some(Role::Manufacturer))
            .iter()
            .map(|e| e.page)
            .collect();
        assert_eq!(
            pages,
            vec!["dashboard", "register", "inventory", "shipments", "blockchain", "settings"]
        );

        let pages: Vec<_> = menu_entries(Some(Role::Retailer)).iter().map(|e| e.page).collect();
        assert_eq!(pages, vec!["dashboard", "blockchain", "settings"]);
    }

    #[test]
    fn test_breadcrumb() {
        let html = breadcrumb(Some(Role::Distributor), "Track Movement").into_string();
        assert!(html.contains("Distributor Portal"));
        assert!(html.contains("Track Movement"));
        assert!(breadcrumb(None, "Dashboard").into_string().contains("User Portal"));
    }

    #[test]
    fn test_frame_marks_active_link() {
        let html = dashboard_frame(
            Some(Role::Customer),
            None,
            &ConnectionStatus::pending(),
            "verify",
            "<p>content</p>",
        );
        assert!(html.contains(r#"class="sidebar-link active" id="nav-verify""#));
        assert!(html.contains("<p>content</p>"));
        assert!(html.contains("Verify Chemical"));
        assert!(html.contains("logout-btn"));
    }

    #[test]
    fn test_document_shows_one_container() {
        let html = app_document(ShellView::Auth, |view| format!("[{}]", view.container_id()));
        assert!(html.contains(r#"id="auth-container" style="display: block""#));
        assert!(html.contains(r#"id="splash-screen" style="display: none""#));
        assert!(html.contains("[dashboard-container]"));
    }
}
