//! Movement logging form

use super::{reset_fields, show_pending, Context, FormValues, ValidationError};
use crate::blockchain::{MovementEvent, MovementResult, MovementStatus};
use crate::dashboard::fragments;
use crate::dashboard::pages::PURPOSES;
use crate::ui::Modal;

pub const RESULT_ID: &str = "movement-result";

pub const FIELDS: [&str; 6] = [
    "movement-tag-id",
    "movement-location",
    "movement-moved-by",
    "movement-purpose",
    "movement-status",
    "movement-remarks",
];

pub const SCAN_NOTICE: &str = "RFID scanning functionality would be integrated with hardware here. For demo purposes, please enter the tag ID manually.";

pub fn parse(form: &FormValues) -> Result<MovementEvent, ValidationError> {
    form.require(
        &["movement-tag-id", "movement-location", "movement-moved-by"],
        "Please fill in all required fields (RFID Tag ID, New Location, and Moved By)",
    )?;

    let status = match form.get("movement-status") {
        Some(raw) => raw.parse::<MovementStatus>().unwrap_or_else(|_| {
            tracing::warn!(status = raw, "Unknown movement status, using in_transit");
            MovementStatus::default()
        }),
        None => MovementStatus::default(),
    };

    Ok(MovementEvent {
        tag_id: form.text("movement-tag-id"),
        location: form.text("movement-location"),
        moved_by: form.text("movement-moved-by"),
        purpose: form
            .optional("movement-purpose")
            .unwrap_or_else(|| PURPOSES[0].to_string()),
        status,
        remarks: form.text("movement-remarks"),
    })
}

pub async fn submit(ctx: &Context<'_>) -> Result<MovementResult, ValidationError> {
    let form = FormValues::read(ctx.surface(), &FIELDS);
    let event = parse(&form).inspect_err(|e| {
        ctx.notices.error(e.to_string());
    })?;

    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, RESULT_ID, "Logging movement...");
    let result = ctx.client.log_event(&event).await;

    match (result.success, result.partial_success) {
        (true, false) => tracing::info!(tag = %event.tag_id, "Movement logged"),
        (true, true) => tracing::warn!(tag = %event.tag_id, "Movement stored locally only"),
        _ => tracing::warn!(tag = %event.tag_id, message = %result.message, "Movement logging failed"),
    }

    let shown = ctx
        .nav
        .write_if_current(&token, RESULT_ID, &fragments::movement_result(&result), Vec::new());
    if shown && result.success {
        reset_fields(ctx.surface(), &FIELDS);
    }
    Ok(result)
}

/// Hardware scanning is not wired up; tell the user to type the tag
pub fn scan_tag(ctx: &Context<'_>) {
    let body = maud::html! { p { (SCAN_NOTICE) } }.into_string();
    ctx.modals.open(Modal::new("Scan RFID Tag", body).cancel_text("Close"));
}
