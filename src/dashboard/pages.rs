//! Built-in page templates

use maud::{html, Markup};

use super::fragments::last_checked;
use crate::blockchain::{ConnectionStatus, MovementStatus, StatusKind};
use crate::session::{Role, Session};

pub const UNITS: [(&str, &str); 5] = [
    ("L", "Liters (L)"),
    ("mL", "Milliliters (mL)"),
    ("kg", "Kilograms (kg)"),
    ("g", "Grams (g)"),
    ("mg", "Milligrams (mg)"),
];

pub const HAZARD_CLASSES: [&str; 6] = [
    "Flammable",
    "Corrosive",
    "Toxic",
    "Oxidizing",
    "Explosive",
    "Non-hazardous",
];

pub const PURPOSES: [&str; 6] = ["Transport", "Storage", "Use", "Disposal", "Return", "Other"];

fn back_button() -> Markup {
    html! {
        button type="button" id="back-to-dashboard-btn" class="btn btn-sm btn-outline-secondary" {
            i class="fas fa-arrow-left" {} " Back to Dashboard"
        }
    }
}

fn card_header(title: &str, with_back: bool) -> Markup {
    html! {
        div class="card-header" {
            h3 class="card-title" { (title) }
            @if with_back {
                (back_button())
            }
        }
    }
}

fn stat(value: &str, label: &str) -> Markup {
    html! {
        div class="stat-item" {
            h4 { (value) }
            p { (label) }
        }
    }
}

fn connection_text(status: &ConnectionStatus) -> &'static str {
    match status.status {
        StatusKind::Pending => "Checking...",
        StatusKind::Connected => "Connected",
        StatusKind::Disconnected | StatusKind::Error => "Disconnected",
    }
}

/// Element ids showing connection status and their refreshed content.
/// Used to update whatever page is mounted when a poll completes.
pub fn status_updates(status: &ConnectionStatus) -> Vec<(&'static str, String)> {
    let text = connection_text(status).to_string();
    vec![
        ("blockchain-status-slot", super::fragments::connection_badge(status).into_string()),
        ("blockchain-connection-status", text.clone()),
        ("blockchain-detail-status", text),
        ("blockchain-last-check", last_checked(status)),
        ("blockchain-last-check-time", last_checked(status)),
        ("blockchain-provider", html! { (status.provider) }.into_string()),
        ("blockchain-contract", html! { (status.short_contract_address()) }.into_string()),
    ]
}

/// Role-specific statistics card; empty for roles without one
pub fn role_section(role: Option<Role>) -> Markup {
    let (title, stats): (&str, [(&str, &str); 3]) = match role {
        Some(Role::Admin) => (
            "System Overview",
            [
                ("157", "Chemicals Registered"),
                ("42", "Active Users"),
                ("98%", "Blockchain Verified"),
            ],
        ),
        Some(Role::Manufacturer) => (
            "Manufacturing Stats",
            [
                ("47", "Chemicals Produced"),
                ("12", "Pending Shipments"),
                ("100%", "Compliance Rate"),
            ],
        ),
        Some(Role::Distributor) => (
            "Distribution Stats",
            [
                ("35", "Active Shipments"),
                ("8", "Pending Transfers"),
                ("156", "Completed Transfers"),
            ],
        ),
        Some(Role::Customer) => (
            "Inventory Stats",
            [
                ("23", "Chemicals in Stock"),
                ("5", "Pending Deliveries"),
                ("100%", "Verified Chemicals"),
            ],
        ),
        Some(Role::Retailer) | None => return html! {},
    };

    html! {
        div class="card mb-4" {
            (card_header(title, false))
            div class="card-body" {
                div class="stat-container" {
                    @for (value, label) in stats {
                        (stat(value, label))
                    }
                }
            }
        }
    }
}

pub fn quick_actions(role: Option<Role>) -> Markup {
    html! {
        @match role {
            Some(Role::Admin) => {
                button class="action-btn" { i class="fas fa-user-plus" {} " Add User" }
                button class="action-btn" { i class="fas fa-search" {} " Chemical Lookup" }
                button class="action-btn" { i class="fas fa-file-export" {} " Export Reports" }
            }
            Some(Role::Manufacturer) => {
                button class="action-btn" id="register-chemical-btn" { i class="fas fa-plus-circle" {} " Register New Chemical" }
                button class="action-btn" { i class="fas fa-truck-loading" {} " Create Shipment" }
                button class="action-btn" { i class="fas fa-print" {} " Print RFID Tags" }
            }
            Some(Role::Distributor) => {
                button class="action-btn" id="scan-rfid-btn" { i class="fas fa-qrcode" {} " Scan RFID Tag" }
                button class="action-btn" { i class="fas fa-map-marker-alt" {} " Log Movement" }
                button class="action-btn" { i class="fas fa-exchange-alt" {} " Transfer Ownership" }
            }
            Some(Role::Customer) => {
                button class="action-btn" id="verify-chemical-btn" { i class="fas fa-check-circle" {} " Verify Chemical" }
                button class="action-btn" { i class="fas fa-history" {} " View History" }
                button class="action-btn" { i class="fas fa-file-import" {} " Import Certificate" }
            }
            Some(Role::Retailer) | None => {}
        }
    }
}

/// Overview: welcome, status, role section, quick actions
pub fn overview(role: Option<Role>, status: &ConnectionStatus) -> Markup {
    html! {
        div class="card span-2" {
            (card_header("Welcome to ChemTrack Dashboard", false))
            div class="card-body" {
                p { "This blockchain-powered chemical traceability system helps manage and track chemicals throughout their lifecycle." }
            }
        }
        div class="card" {
            (card_header("Blockchain Status", false))
            div class="card-body" id="blockchain-status-card" {
                p { strong { "Status:" } " " span id="blockchain-connection-status" { (connection_text(status)) } }
                p { strong { "Last Check:" } " " span id="blockchain-last-check" { (last_checked(status)) } }
            }
        }
        (role_section(role))
        div class="card" {
            (card_header("Quick Actions", false))
            div class="card-body" {
                (quick_actions(role))
            }
        }
    }
}

pub fn blockchain(status: &ConnectionStatus) -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Blockchain Connection", false))
            div class="card-body" {
                p { strong { "Connection Status:" } " " span id="blockchain-detail-status" { (connection_text(status)) } }
                @if status.status == StatusKind::Error {
                    p class="text-danger" { (status.label()) }
                }
                p { strong { "Provider:" } " " span id="blockchain-provider" { (status.provider) } }
                p { strong { "Smart Contract:" } " " span id="blockchain-contract" { (status.short_contract_address()) } }
                p { strong { "Last Connection Check:" } " " span id="blockchain-last-check-time" { (last_checked(status)) } }
                button class="action-btn" id="refresh-blockchain-btn" {
                    i class="fas fa-sync" {} " Check Connection"
                }
            }
        }
        div class="card span-3" {
            (card_header("Blockchain Verification Statistics", false))
            div class="card-body" {
                div class="stat-container" {
                    (stat("157", "Blockchain Records"))
                    (stat("98%", "Verification Rate"))
                    (stat("3", "Pending Transactions"))
                }
            }
        }
    }
}

fn text_field(id: &str, label: &str, required: bool) -> Markup {
    let label = if required { format!("{}*", label) } else { label.to_string() };
    html! {
        div class="form-group" {
            label for=(id) { (label) }
            input type="text" id=(id) class="form-control" required[required];
        }
    }
}

pub fn register() -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Register New Chemical", true))
            div class="card-body" {
                form id="register-chemical-form" {
                    (text_field("chemical-name", "Chemical Name", true))
                    (text_field("chemical-rfid", "RFID Tag ID", true))
                    (text_field("chemical-manufacturer", "Manufacturer", true))
                    div class="form-row" {
                        div class="form-group col-md-6" {
                            label for="chemical-quantity" { "Quantity" }
                            input type="number" step="0.01" id="chemical-quantity" class="form-control";
                        }
                        div class="form-group col-md-6" {
                            label for="chemical-unit" { "Unit" }
                            select id="chemical-unit" class="form-control" {
                                @for (value, label) in UNITS {
                                    option value=(value) { (label) }
                                }
                            }
                        }
                    }
                    div class="form-row" {
                        div class="form-group col-md-6" {
                            label for="chemical-expiry" { "Expiry Date" }
                            input type="date" id="chemical-expiry" class="form-control";
                        }
                        div class="form-group col-md-6" {
                            label for="chemical-received" { "Received Date" }
                            input type="date" id="chemical-received" class="form-control";
                        }
                    }
                    div class="form-row" {
                        div class="form-group col-md-6" {
                            label for="chemical-hazard" { "Hazard Class" }
                            select id="chemical-hazard" class="form-control" {
                                option value="" { "Select Hazard Class" }
                                @for hazard in HAZARD_CLASSES {
                                    option value=(hazard) { (hazard) }
                                }
                            }
                        }
                        div class="form-group col-md-6" {
                            label for="chemical-cas" { "CAS Number" }
                            input type="text" id="chemical-cas" class="form-control";
                        }
                    }
                    div class="form-group" {
                        label for="chemical-storage" { "Storage Conditions" }
                        input type="text" id="chemical-storage" class="form-control"
                            placeholder="e.g., Keep refrigerated, Store in dark place";
                    }
                    (text_field("chemical-batch", "Batch Number", false))
                    div class="form-group" {
                        label for="chemical-location" { "Current Location*" }
                        input type="text" id="chemical-location" class="form-control" required
                            placeholder="e.g., Lab 101, Warehouse A";
                    }
                    div class="form-group" {
                        label for="chemical-description" { "Description" }
                        textarea id="chemical-description" class="form-control" rows="3" {}
                    }
                    div class="form-actions" {
                        button type="button" id="submit-chemical-btn" class="action-btn" {
                            i class="fas fa-save" {} " Register Chemical"
                        }
                        button type="reset" class="action-btn secondary" {
                            i class="fas fa-undo" {} " Reset Form"
                        }
                    }
                }
                div id="register-result" class="mt-3" {}
            }
        }
    }
}

pub fn track() -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Track Chemical Movement", true))
            div class="card-body" {
                form id="track-movement-form" {
                    div class="form-group" {
                        label for="movement-tag-id" { "RFID Tag ID*" }
                        div class="input-group" {
                            input type="text" id="movement-tag-id" class="form-control" required;
                            button type="button" id="scan-tag-btn" class="btn btn-secondary" {
                                i class="fas fa-qrcode" {} " Scan"
                            }
                        }
                    }
                    (text_field("movement-location", "New Location", true))
                    (text_field("movement-moved-by", "Moved By", true))
                    div class="form-group" {
                        label for="movement-purpose" { "Purpose" }
                        select id="movement-purpose" class="form-control" {
                            @for purpose in PURPOSES {
                                option value=(purpose) { (purpose) }
                            }
                        }
                    }
                    div class="form-group" {
                        label for="movement-status" { "Status" }
                        select id="movement-status" class="form-control" {
                            @for status in MovementStatus::FORM_CHOICES {
                                option value=(status.as_str()) { (status.label()) }
                            }
                        }
                    }
                    div class="form-group" {
                        label for="movement-remarks" { "Remarks" }
                        textarea id="movement-remarks" class="form-control" rows="3" {}
                    }
                    div class="form-actions" {
                        button type="button" id="submit-movement-btn" class="action-btn" {
                            i class="fas fa-map-marker-alt" {} " Log Movement"
                        }
                        button type="reset" class="action-btn secondary" {
                            i class="fas fa-undo" {} " Reset Form"
                        }
                    }
                }
                div id="movement-result" class="mt-3" {}
            }
        }
    }
}

/// Lookup by RFID, location update and on-chain verification
pub fn scan() -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Update Chemical Location", true))
            div class="card-body" {
                form id="update-location-form" {
                    div class="form-group" {
                        label for="scan-rfid-input" { "RFID Tag*" }
                        div class="input-group" {
                            input type="text" id="scan-rfid-input" class="form-control" required;
                            button type="button" id="find-chemical-btn" class="btn btn-outline-primary" {
                                i class="fas fa-search" {} " Find"
                            }
                        }
                    }
                    div id="chemical-details-container" class="mb-3" {}
                    (text_field("new-location", "New Location", true))
                    div class="form-group" {
                        label for="location-purpose" { "Purpose" }
                        select id="location-purpose" class="form-control" {
                            @for purpose in PURPOSES {
                                option value=(purpose) { (purpose) }
                            }
                        }
                    }
                    div class="form-group" {
                        label for="location-remarks" { "Remarks" }
                        textarea id="location-remarks" class="form-control" rows="2" {}
                    }
                    button type="button" class="btn btn-primary" id="update-location-btn" {
                        i class="fas fa-map-marker-alt" {} " Update Location"
                    }
                }
            }
        }
        div class="card" {
            (card_header("Blockchain Verification", false))
            div class="card-body" {
                div id="blockchain-verification-status" class="mb-3" {
                    div class="alert alert-secondary" { "Search for a chemical to verify it on the blockchain." }
                }
                div id="verification-details-container" {}
                button class="btn btn-outline-primary btn-sm" id="verify-blockchain-btn" {
                    i class="fas fa-shield-alt" {} " Verify on Blockchain"
                }
            }
        }
        div class="card span-3" {
            (card_header("Movement History", false))
            div class="card-body" {
                div id="movement-history-content" {
                    div class="text-muted" { "Search for a chemical to see its movement history." }
                }
            }
        }
    }
}

pub fn verify() -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Verify Chemical", true))
            div class="card-body" {
                div class="form-group" {
                    label for="verify-rfid-input" { "RFID Tag*" }
                    div class="input-group" {
                        input type="text" id="verify-rfid-input" class="form-control" required;
                        button type="button" id="verify-submit-btn" class="btn btn-primary" {
                            i class="fas fa-check-circle" {} " Verify"
                        }
                    }
                }
                div id="verify-result" class="mt-3" {}
            }
        }
    }
}

pub fn history() -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Movement History", true))
            div class="card-body" {
                div class="form-group" {
                    label for="history-rfid-input" { "RFID Tag*" }
                    div class="input-group" {
                        input type="text" id="history-rfid-input" class="form-control" required;
                        button type="button" id="history-load-btn" class="btn btn-primary" {
                            i class="fas fa-history" {} " Load History"
                        }
                    }
                }
                div id="history-result" class="mt-3" {}
            }
        }
    }
}

/// Account and connection settings for the signed-in user
pub fn settings(session: &Session, backend_url: &str, poll_secs: u64) -> Markup {
    html! {
        div class="card span-3" {
            (card_header("Settings", true))
            div class="card-body" {
                h4 { "Account" }
                div class="info-list" {
                    div class="info-item" { span { "Name:" } span id="settings-name" { (session.display_name()) } }
                    div class="info-item" { span { "Email:" } span id="settings-email" { (session.email) } }
                    div class="info-item" { span { "Role:" } span id="settings-role" { (session.role.title()) } }
                }
                h4 class="mt-3" { "Connection" }
                div class="info-list" {
                    div class="info-item" { span { "Backend:" } span id="settings-backend" { (backend_url) } }
                    div class="info-item" {
                        span { "Status check:" }
                        span id="settings-poll" { "every " (poll_secs) " seconds" }
                    }
                }
            }
        }
    }
}
