//! RFID lookup, location update and on-chain verification

use chrono::Local;
use std::sync::{Mutex, PoisonError};

use super::{reset_fields, show_pending, Context, FormValues, ValidationError};
use crate::blockchain::{ChemicalRecord, LocationUpdate, VerificationResult};
use crate::dashboard::fragments;
use crate::dashboard::pages::PURPOSES;
use crate::navigation::NavigationToken;

pub const DETAILS_ID: &str = "chemical-details-container";
pub const STATUS_ID: &str = "blockchain-verification-status";
pub const VERIFICATION_ID: &str = "verification-details-container";
pub const HISTORY_ID: &str = "movement-history-content";
pub const VERIFY_RESULT_ID: &str = "verify-result";

const LOCATION_FIELDS: [&str; 3] = ["new-location", "location-purpose", "location-remarks"];

/// The chemical most recently found on the scan page
#[derive(Debug, Default)]
pub struct Selection {
    current: Mutex<Option<ChemicalRecord>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ChemicalRecord> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, chemical: ChemicalRecord) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(chemical);
    }

    pub fn clear(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn set_location(&self, location: &str) {
        if let Some(chemical) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            chemical.location = Some(location.to_string());
            chemical.last_updated = Some(Local::now().to_rfc3339());
        }
    }
}

fn require_tag(ctx: &Context<'_>, input_id: &str) -> Result<String, ValidationError> {
    let form = FormValues::read(ctx.surface(), &[input_id]);
    form.require(&[input_id], "Please enter an RFID tag")
        .inspect_err(|e| {
            ctx.notices.warning(e.to_string());
        })?;
    Ok(form.text(input_id))
}

fn now_label() -> String {
    Local::now().format("%b %-d, %Y %H:%M").to_string()
}

/// Find the chemical typed into the scan page and load its movements
pub async fn find_chemical(ctx: &Context<'_>) -> Result<Option<ChemicalRecord>, ValidationError> {
    let rfid = require_tag(ctx, "scan-rfid-input")?;
    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, STATUS_ID, "Searching for chemical...");

    match ctx.client.find_chemical(&rfid).await {
        Ok(chemical) => {
            if !token.is_current() {
                return Ok(Some(chemical));
            }
            ctx.selection.set(chemical.clone());
            ctx.nav.write_if_current(&token, DETAILS_ID, &fragments::chemical_details(&chemical), Vec::new());

            let found = format!(
                "Chemical {} (RFID: {}) found. Verify on blockchain for traceability.",
                chemical.name, chemical.rfid_tag
            );
            ctx.nav.write_if_current(
                &token,
                STATUS_ID,
                &fragments::alert("primary", &found).into_string(),
                Vec::new(),
            );

            load_movements(ctx, &rfid, &token).await;
            Ok(Some(chemical))
        }
        Err(e) => {
            tracing::warn!(rfid = %rfid, error = %e, "Chemical lookup failed");
            ctx.nav.write_if_current(
                &token,
                STATUS_ID,
                &fragments::alert("danger", &e.to_string()).into_string(),
                Vec::new(),
            );
            Ok(None)
        }
    }
}

/// Movement table for `rfid` on the scan page
pub async fn load_movements(ctx: &Context<'_>, rfid: &str, token: &NavigationToken) -> bool {
    show_pending(ctx, token, HISTORY_ID, "Loading history...");
    let html = match ctx.client.movement_history(rfid).await {
        Ok(movements) => fragments::movement_table(&movements),
        Err(e) => {
            tracing::warn!(rfid, error = %e, "Could not load movement history");
            fragments::alert("danger", "Error loading movement history.").into_string()
        }
    };
    ctx.nav.write_if_current(token, HISTORY_ID, &html, Vec::new())
}

/// Verify the selected chemical on chain
pub async fn verify_selected(ctx: &Context<'_>) -> Result<Option<VerificationResult>, ValidationError> {
    let chemical = selected(ctx)?;
    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, VERIFICATION_ID, "Verifying on blockchain...");

    match ctx.client.verify_chemical(&chemical.rfid_tag).await {
        Ok(result) => {
            let html = fragments::verification_details(&result, &now_label());
            if ctx.nav.write_if_current(&token, VERIFICATION_ID, &html, Vec::new()) {
                ctx.notices.success("Blockchain verification complete");
            }
            Ok(Some(result))
        }
        Err(e) => {
            tracing::warn!(rfid = %chemical.rfid_tag, error = %e, "Blockchain verification failed");
            ctx.nav.write_if_current(
                &token,
                VERIFICATION_ID,
                &fragments::alert("danger", "Error during blockchain verification.").into_string(),
                Vec::new(),
            );
            Ok(None)
        }
    }
}

/// Move the selected chemical to the location typed on the scan page
pub async fn update_location(ctx: &Context<'_>) -> Result<Option<LocationUpdate>, ValidationError> {
    let chemical = selected(ctx)?;
    let form = FormValues::read(ctx.surface(), &LOCATION_FIELDS);
    form.require(&["new-location"], "Please enter the new location")
        .inspect_err(|e| {
            ctx.notices.warning(e.to_string());
        })?;

    let update = LocationUpdate {
        rfid_tag: chemical.rfid_tag.clone(),
        from_location: chemical
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        to_location: form.text("new-location"),
        purpose: form
            .optional("location-purpose")
            .unwrap_or_else(|| PURPOSES[0].to_string()),
        remarks: form.text("location-remarks"),
    };

    let token = ctx.nav.begin_request();
    match ctx.client.create_movement(&update).await {
        Ok(_) => {
            tracing::info!(rfid = %update.rfid_tag, to = %update.to_location, "Location updated");
            ctx.selection.set_location(&update.to_location);
            if token.is_current() {
                if let Some(chemical) = ctx.selection.get() {
                    ctx.nav.write_if_current(
                        &token,
                        DETAILS_ID,
                        &fragments::chemical_details(&chemical),
                        Vec::new(),
                    );
                }
                reset_fields(ctx.surface(), &LOCATION_FIELDS);
                ctx.notices.success("Location updated successfully");
                load_movements(ctx, &update.rfid_tag, &token).await;
            }
            Ok(Some(update))
        }
        Err(e) => {
            tracing::warn!(rfid = %update.rfid_tag, error = %e, "Location update failed");
            ctx.notices.error(e.to_string());
            Ok(None)
        }
    }
}

/// Standalone verify page (customer)
pub async fn verify_lookup(ctx: &Context<'_>) -> Result<Option<VerificationResult>, ValidationError> {
    let rfid = require_tag(ctx, "verify-rfid-input")?;
    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, VERIFY_RESULT_ID, "Verifying on blockchain...");

    match ctx.client.verify_chemical(&rfid).await {
        Ok(result) => {
            let html = fragments::verification_details(&result, &now_label());
            if ctx.nav.write_if_current(&token, VERIFY_RESULT_ID, &html, Vec::new()) {
                ctx.notices.success("Blockchain verification complete");
            }
            Ok(Some(result))
        }
        Err(e) => {
            tracing::warn!(rfid = %rfid, error = %e, "Verification lookup failed");
            ctx.nav.write_if_current(
                &token,
                VERIFY_RESULT_ID,
                &fragments::alert("danger", &e.to_string()).into_string(),
                Vec::new(),
            );
            Ok(None)
        }
    }
}

fn selected(ctx: &Context<'_>) -> Result<ChemicalRecord, ValidationError> {
    ctx.selection.get().ok_or_else(|| {
        let err = ValidationError::NoChemicalSelected;
        ctx.notices.warning(err.to_string());
        err
    })
}
