//! Reusable HTML fragments: badges, alerts, result panels and tables

use chrono::{DateTime, NaiveDateTime};
use maud::{html, Markup};

use crate::blockchain::{
    ChemicalRecord, ConnectionStatus, HistoryResult, MovementRecord, MovementResult,
    RegistrationResult, StatusKind, VerificationResult,
};

/// Bootstrap colour for a movement status key
pub fn status_badge_class(status: &str) -> &'static str {
    match status {
        "in_transit" => "info",
        "delivered" => "success",
        "returned" => "warning",
        "damaged" => "danger",
        "lost" => "dark",
        _ => "secondary",
    }
}

/// `in_transit` -> `In Transit`
pub fn format_status(status: &str) -> String {
    status
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a backend timestamp as `Jan 2, 2025 10:00`; unparseable values pass through
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%b %-d, %Y %H:%M").to_string();
        }
    }
    raw.to_string()
}

pub fn alert(kind: &str, message: &str) -> Markup {
    let class = format!("alert alert-{}", kind);
    html! {
        div class=(class) { (message) }
    }
}

/// Spinner shown while a page is resolved
pub fn loading(page: &str) -> String {
    html! {
        div class="d-flex justify-content-center align-items-center loading-state" {
            div class="spinner-border text-primary" role="status" {
                span class="visually-hidden" { "Loading..." }
            }
            span class="ms-3" { "Loading " (page) "..." }
        }
    }
    .into_string()
}

/// Spinner placed in a result container while its request is in flight
pub fn processing(message: &str) -> String {
    html! {
        div class="text-center p-3 processing-state" {
            div class="spinner-border spinner-border-sm text-primary" role="status" {
                span class="visually-hidden" { "Loading..." }
            }
            span class="ms-2" { (message) }
        }
    }
    .into_string()
}

/// Inline panel replacing page content when rendering failed
pub fn error_panel(message: &str) -> String {
    let message = if message.trim().is_empty() {
        "Unknown error"
    } else {
        message
    };
    html! {
        div class="alert alert-danger" {
            h4 { "Error Loading Page" }
            p { "There was an error loading the requested page. Please try again later." }
            pre class="small text-muted mt-2" { (message) }
        }
    }
    .into_string()
}

/// Generic content for page keys without a template
pub fn placeholder(page: &str, title: &str) -> Markup {
    html! {
        div class="card span-3" {
            div class="card-header" {
                h3 class="card-title" { (title) }
            }
            div class="card-body" {
                p { "This " (page) " functionality is under development." }
            }
        }
    }
}

/// Header indicator, `connected` or `disconnected`
pub fn connection_badge(status: &ConnectionStatus) -> Markup {
    let (state, text) = match status.status {
        StatusKind::Pending => ("disconnected", "Checking blockchain..."),
        StatusKind::Connected => ("connected", "Blockchain Connected"),
        StatusKind::Disconnected | StatusKind::Error => ("disconnected", "Blockchain Disconnected"),
    };
    let class = format!("blockchain-status {}", state);
    html! {
        div class=(class) id="header-blockchain-status" {
            div class="blockchain-status-icon" {}
            span { (text) }
        }
    }
}

pub fn last_checked(status: &ConnectionStatus) -> String {
    status
        .last_checked_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn registration_result(result: &RegistrationResult) -> String {
    html! {
        @if result.success {
            div class="alert alert-success" id="register-result" {
                h4 { i class="fas fa-check-circle" {} " Chemical Registered Successfully" }
                p { "The chemical has been registered in the database." }
                p {
                    strong { "Blockchain status:" }
                    @if result.blockchain_status {
                        " Verified and recorded on blockchain"
                    } @else {
                        " Recorded in local database only"
                    }
                }
            }
        } @else {
            div class="alert alert-danger" id="register-result" {
                h4 { i class="fas fa-exclamation-triangle" {} " Registration Failed" }
                p { (result.message) }
            }
        }
    }
    .into_string()
}

pub fn movement_result(result: &MovementResult) -> String {
    html! {
        @if result.success {
            @let class = if result.partial_success { "alert alert-warning" } else { "alert alert-success" };
            div class=(class) id="movement-result" {
                h4 { i class="fas fa-check-circle" {} " Movement Logged Successfully" }
                p { "The chemical movement has been recorded." }
                @if result.partial_success {
                    p {
                        strong { "Note:" }
                        " Movement was recorded in the local database, but blockchain verification failed."
                    }
                    p class="text-muted" { "This could be due to network issues or blockchain unavailability." }
                } @else if result.blockchain_status {
                    p {
                        strong { "Blockchain status:" }
                        " Successfully verified and recorded on blockchain"
                    }
                }
            }
        } @else {
            div class="alert alert-danger" id="movement-result" {
                h4 { i class="fas fa-exclamation-triangle" {} " Movement Logging Failed" }
                p { (result.message) }
            }
        }
    }
    .into_string()
}

pub fn chemical_details(chemical: &ChemicalRecord) -> String {
    html! {
        div class="card bg-light" id="chemical-details" {
            div class="card-body" {
                h5 class="mb-2" { (chemical.name) }
                ul class="list-unstyled mb-0" {
                    li { strong { "RFID Tag:" } " " (chemical.rfid_tag) }
                    li { strong { "Manufacturer:" } " " (chemical.manufacturer) }
                    li { strong { "Current Location:" } " " (chemical.location.as_deref().unwrap_or("Unknown")) }
                    li { strong { "Last Updated:" } " " (format_timestamp(chemical.last_updated.as_deref())) }
                }
            }
        }
    }
    .into_string()
}

/// Table of `/api/movements/{rfid}` rows
pub fn movement_table(movements: &[MovementRecord]) -> String {
    if movements.is_empty() {
        return html! {
            div class="alert alert-info" {
                i class="fas fa-info-circle" {}
                " No movement history found for this chemical."
            }
        }
        .into_string();
    }

    html! {
        div class="table-responsive" {
            table class="table table-striped table-hover" {
                thead {
                    tr { th { "Date" } th { "From" } th { "To" } th { "Purpose" } th { "Status" } }
                }
                tbody {
                    @for movement in movements {
                        tr {
                            td { (format_timestamp(movement.timestamp.as_deref())) }
                            td { (movement.from_location.as_deref().unwrap_or("N/A")) }
                            td { (movement.to_location) }
                            td { (movement.purpose) }
                            td {
                                @if movement.verified {
                                    span class="badge bg-success" { "Verified" }
                                } @else {
                                    span class="badge bg-warning text-dark" { "Pending" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Timeline of `get_chemical_history` with the verified/unverified banner
pub fn history_timeline(result: &HistoryResult) -> String {
    html! {
        @if !result.success {
            div class="alert alert-danger" { (result.message) }
        } @else {
            @if result.blockchain_enabled {
                div class="alert alert-success" {
                    i class="fas fa-shield-alt" {} " " (result.message)
                }
            } @else {
                div class="alert alert-warning" {
                    i class="fas fa-exclamation-triangle" {}
                    " " (result.blockchain_error.as_deref().unwrap_or(result.message.as_str()))
                }
            }
            @if result.history.is_empty() {
                div class="text-muted text-center py-4" { "No movement history found" }
            } @else {
                div class="timeline" {
                    @for event in &result.history {
                        div class="timeline-item" {
                            div class="timeline-marker" {}
                            div class="timeline-content" {
                                p class="mb-1" {
                                    strong { (format_timestamp(event.timestamp.as_deref())) }
                                    " - Moved to " (event.location)
                                }
                                @if let Some(purpose) = event.purpose.as_deref().filter(|p| !p.is_empty()) {
                                    p class="text-muted small mb-0" { "Purpose: " (purpose) }
                                }
                                @if let Some(status) = event.status.as_deref().filter(|s| !s.is_empty()) {
                                    @let class = format!("badge badge-{}", status_badge_class(status));
                                    span class=(class) { (format_status(status)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

/// On-chain verification outcome
pub fn verification_details(result: &VerificationResult, checked_at: &str) -> String {
    html! {
        div id="verification-details" {
            table class="table table-sm" {
                tbody {
                    tr {
                        th { "Chain Integrity" }
                        td {
                            @if result.verified {
                                span class="badge bg-success" { "Verified" }
                            } @else {
                                span class="badge bg-danger" { "Failed" }
                            }
                        }
                    }
                    tr { th { "Last Verification" } td { (checked_at) } }
                    tr {
                        th { "Block Number" }
                        td {
                            @match result.block_number {
                                Some(n) => { (n.to_string()) }
                                None => { "-" }
                            }
                        }
                    }
                }
            }
        }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::HistoryEntry;

    #[test]
    fn test_status_badges() {
        assert_eq!(status_badge_class("in_transit"), "info");
        assert_eq!(status_badge_class("delivered"), "success");
        assert_eq!(status_badge_class("returned"), "warning");
        assert_eq!(status_badge_class("damaged"), "danger");
        assert_eq!(status_badge_class("lost"), "dark");
        assert_eq!(status_badge_class("in_storage"), "secondary");
        assert_eq!(format_status("in_transit"), "In Transit");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Some("2025-01-02T10:05:00")), "Jan 2, 2025 10:05");
        assert_eq!(format_timestamp(Some("2025-01-02T10:05:00Z")), "Jan 2, 2025 10:05");
        assert_eq!(format_timestamp(Some("yesterday")), "yesterday");
        assert_eq!(format_timestamp(None), "N/A");
    }

    #[test]
    fn test_error_panel_escapes() {
        let html = error_panel("<script>x</script>");
        assert!(html.contains("Error Loading Page"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(error_panel("").contains("Unknown error"));
    }

    #[test]
    fn test_movement_table() {
        assert!(movement_table(&[]).contains("No movement history found"));

        let html = movement_table(&[MovementRecord {
            timestamp: Some("2025-03-01T08:00:00".into()),
            from_location: None,
            to_location: "Lab 4".into(),
            purpose: "Use".into(),
            verified: true,
        }]);
        assert!(html.contains("N/A"));
        assert!(html.contains("Lab 4"));
        assert!(html.contains("bg-success"));
    }

    #[test]
    fn test_history_timeline_unverified_banner() {
        let html = history_timeline(&HistoryResult {
            success: true,
            history: vec![HistoryEntry {
                location: "Dock".into(),
                status: Some("in_transit".into()),
                ..Default::default()
            }],
            blockchain_enabled: false,
            blockchain_error: Some("Blockchain verification unavailable".into()),
            message: "Retrieved chemical history from local database".into(),
        });
        assert!(html.contains("alert-warning"));
        assert!(html.contains("Blockchain verification unavailable"));
        assert!(html.contains("badge badge-info"));
        assert!(html.contains("In Transit"));
    }

    #[test]
    fn test_movement_result_partial() {
        let html = movement_result(&MovementResult {
            success: true,
            partial_success: true,
            blockchain_status: false,
            data: None,
            message: String::new(),
        });
        assert!(html.contains("alert-warning"));
        assert!(html.contains("blockchain verification failed"));
    }
}
