//! Movement history page

use super::{show_pending, Context, FormValues, ValidationError};
use crate::blockchain::HistoryResult;
use crate::dashboard::fragments;

pub const INPUT_ID: &str = "history-rfid-input";
pub const RESULT_ID: &str = "history-result";

pub async fn load(ctx: &Context<'_>) -> Result<HistoryResult, ValidationError> {
    let form = FormValues::read(ctx.surface(), &[INPUT_ID]);
    form.require(&[INPUT_ID], "Please enter an RFID tag")
        .inspect_err(|e| {
            ctx.notices.warning(e.to_string());
        })?;
    let tag = form.text(INPUT_ID);

    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, RESULT_ID, "Loading history...");
    let result = ctx.client.get_chemical_history(&tag).await;

    if !result.success {
        tracing::warn!(tag = %tag, message = %result.message, "History lookup failed");
    } else if !result.blockchain_enabled {
        tracing::info!(tag = %tag, "Showing unverified local history");
    }

    ctx.nav
        .write_if_current(&token, RESULT_ID, &fragments::history_timeline(&result), Vec::new());
    Ok(result)
}
