//! Chemical registration form

use super::{reset_fields, show_pending, Context, FormValues, ValidationError};
use crate::blockchain::{ChemicalRegistration, RegistrationResult};
use crate::dashboard::fragments;
use crate::dashboard::pages::UNITS;

pub const RESULT_ID: &str = "register-result";

pub const FIELDS: [&str; 13] = [
    "chemical-name",
    "chemical-rfid",
    "chemical-manufacturer",
    "chemical-location",
    "chemical-quantity",
    "chemical-unit",
    "chemical-expiry",
    "chemical-received",
    "chemical-storage",
    "chemical-hazard",
    "chemical-cas",
    "chemical-batch",
    "chemical-description",
];

const REQUIRED: [&str; 4] = [
    "chemical-name",
    "chemical-rfid",
    "chemical-manufacturer",
    "chemical-location",
];

pub fn parse(form: &FormValues) -> Result<ChemicalRegistration, ValidationError> {
    form.require(&REQUIRED, "Please fill in all required fields")?;

    let quantity = match form.get("chemical-quantity") {
        Some(raw) => Some(
            raw.parse::<f64>()
                .ok()
                .filter(|q| q.is_finite())
                .ok_or(ValidationError::InvalidQuantity)?,
        ),
        None => None,
    };

    Ok(ChemicalRegistration {
        name: form.text("chemical-name"),
        rfid_tag: form.text("chemical-rfid"),
        manufacturer: form.text("chemical-manufacturer"),
        current_location: form.text("chemical-location"),
        quantity,
        unit: form
            .optional("chemical-unit")
            .unwrap_or_else(|| UNITS[0].0.to_string()),
        expiry_date: form.optional("chemical-expiry"),
        received_date: form.optional("chemical-received"),
        storage_condition: form.optional("chemical-storage"),
        hazard_class: form.optional("chemical-hazard"),
        cas_number: form.optional("chemical-cas"),
        batch_number: form.optional("chemical-batch"),
        description: form.optional("chemical-description"),
    })
}

/// Validate and submit the register form
pub async fn submit(ctx: &Context<'_>) -> Result<RegistrationResult, ValidationError> {
    let form = FormValues::read(ctx.surface(), &FIELDS);
    let chemical = parse(&form).inspect_err(|e| {
        ctx.notices.error(e.to_string());
    })?;

    let token = ctx.nav.begin_request();
    show_pending(ctx, &token, RESULT_ID, "Registering chemical...");
    let result = ctx.client.register_chemical(&chemical).await;

    if result.success {
        tracing::info!(rfid = %chemical.rfid_tag, on_chain = result.blockchain_status, "Chemical registered");
    } else {
        tracing::warn!(rfid = %chemical.rfid_tag, message = %result.message, "Chemical registration failed");
    }

    let shown = ctx.nav.write_if_current(
        &token,
        RESULT_ID,
        &fragments::registration_result(&result),
        Vec::new(),
    );
    if shown && result.success {
        reset_fields(ctx.surface(), &FIELDS);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ContentSurface;
    use crate::session::Role;
    use crate::transport::mock::MockTransport;
    use crate::transport::Method;
    use crate::workflows::testing::Fixture;
    use serde_json::json;
    use std::time::Duration;

    fn filled() -> FormValues {
        FormValues::new()
            .with("chemical-name", "Acetone")
            .with("chemical-rfid", "RFID-001")
            .with("chemical-manufacturer", "ChemCorp")
            .with("chemical-location", "Warehouse A")
    }

    #[test]
    fn test_parse_defaults() {
        let chemical = parse(&filled()).unwrap();
        assert_eq!(chemical.unit, "L");
        assert_eq!(chemical.quantity, None);
        assert_eq!(chemical.current_location, "Warehouse A");
        assert_eq!(chemical.cas_number, None);
    }

    #[test]
    fn test_parse_quantity() {
        let chemical = parse(&filled().with("chemical-quantity", "2.5")).unwrap();
        assert_eq!(chemical.quantity, Some(2.5));

        let err = parse(&filled().with("chemical-quantity", "lots")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidQuantity);
    }

    #[tokio::test]
    async fn test_missing_rfid_never_reaches_network() {
        let fx = Fixture::new(MockTransport::new(), Some(Role::Manufacturer));
        fx.nav.navigate_to("register", true);
        fx.fill(&[
            ("chemical-name", "Acetone"),
            ("chemical-manufacturer", "ChemCorp"),
            ("chemical-location", "Warehouse A"),
        ]);

        let err = submit(&fx.ctx()).await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields");
        assert_eq!(fx.transport.call_count(), 0);
        assert_eq!(
            fx.notices.latest().map(|(_, m)| m).as_deref(),
            Some("Please fill in all required fields")
        );
    }

    #[tokio::test]
    async fn test_submit_renders_result_and_resets() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/register-chemical",
            201,
            json!({"id": 9, "blockchain": {"success": true}}),
        );
        let fx = Fixture::new(transport, Some(Role::Manufacturer));
        fx.nav.navigate_to("register", true);
        fx.fill(&[
            ("chemical-name", "Acetone"),
            ("chemical-rfid", "RFID-001"),
            ("chemical-manufacturer", "ChemCorp"),
            ("chemical-location", "Warehouse A"),
        ]);

        let result = submit(&fx.ctx()).await.unwrap();
        assert!(result.success);

        let html = fx.surface.content(RESULT_ID).unwrap();
        assert!(html.contains("Chemical Registered Successfully"));
        assert!(html.contains("Verified and recorded on blockchain"));
        assert_eq!(fx.surface.field_value("chemical-name").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_failure_keeps_form() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/register-chemical",
            409,
            json!({"message": "RFID tag already registered"}),
        );
        let fx = Fixture::new(transport, Some(Role::Manufacturer));
        fx.nav.navigate_to("register", true);
        fx.fill(&[
            ("chemical-name", "Acetone"),
            ("chemical-rfid", "RFID-001"),
            ("chemical-manufacturer", "ChemCorp"),
            ("chemical-location", "Warehouse A"),
        ]);

        let result = submit(&fx.ctx()).await.unwrap();
        assert!(!result.success);
        assert!(fx.surface.content(RESULT_ID).unwrap().contains("RFID tag already registered"));
        assert_eq!(fx.surface.field_value("chemical-rfid").as_deref(), Some("RFID-001"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_state_until_response() {
        let transport = MockTransport::new()
            .respond(
                Method::Post,
                "/register-chemical",
                201,
                json!({"blockchain": {"success": true}}),
            )
            .with_latency(Duration::from_millis(250));
        let fx = Fixture::new(transport, Some(Role::Manufacturer));
        fx.nav.navigate_to("register", true);
        fx.fill(&[
            ("chemical-name", "Toluene"),
            ("chemical-rfid", "RFID-77"),
            ("chemical-manufacturer", "ChemCorp"),
            ("chemical-location", "Lab 101"),
        ]);

        let ctx = fx.ctx();
        let (result, pending) = tokio::join!(submit(&ctx), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            fx.surface.content(RESULT_ID).unwrap()
        });

        assert!(pending.contains("Registering chemical..."));
        assert!(result.unwrap().success);
        assert!(!fx.surface.content(RESULT_ID).unwrap().contains("Registering chemical..."));
    }
}
