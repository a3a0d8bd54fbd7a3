//! Feature workflows
//!
//! Handlers behind the dashboard buttons. Each one reads its form from the
//! content surface, validates it before any network call, runs the client
//! request and writes the result back only if the page that started the
//! request is still mounted.

pub mod auth_forms;
pub mod feedback;
pub mod history;
pub mod lookup;
pub mod movement;
pub mod registration;

pub use feedback::{ModalHost, Notifier};
pub use lookup::Selection;

use std::collections::HashMap;
use thiserror::Error;

use crate::blockchain::BlockchainClient;
use crate::dashboard::fragments;
use crate::navigation::{ContentSurface, NavigationController, NavigationToken};
use crate::session::AuthStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required inputs left empty; carries the user-facing message
    #[error("{message}")]
    MissingFields {
        message: String,
        fields: Vec<String>,
    },

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Quantity must be a number")]
    InvalidQuantity,

    #[error("Please select a role first")]
    NoRoleSelected,

    #[error("Please search for a chemical first")]
    NoChemicalSelected,
}

/// Trimmed input values keyed by element id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: HashMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `ids` as currently entered on the surface
    pub fn read(surface: &dyn ContentSurface, ids: &[&str]) -> Self {
        let values = ids
            .iter()
            .filter_map(|id| surface.field_value(id).map(|v| (id.to_string(), v)))
            .collect();
        Self { values }
    }

    pub fn with(mut self, id: &str, value: &str) -> Self {
        self.values.insert(id.to_string(), value.to_string());
        self
    }

    /// Value of `id`; `None` when missing or blank
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values
            .get(id)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self, id: &str) -> String {
        self.get(id).unwrap_or_default().to_string()
    }

    pub fn optional(&self, id: &str) -> Option<String> {
        self.get(id).map(str::to_string)
    }

    /// Fail with `message` unless every id in `ids` has a value
    pub fn require(&self, ids: &[&str], message: &str) -> Result<(), ValidationError> {
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| self.get(id).is_none())
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields {
                message: message.to_string(),
                fields: missing,
            })
        }
    }
}

/// Clear inputs after a successful submit
pub(crate) fn reset_fields(surface: &dyn ContentSurface, ids: &[&str]) {
    for id in ids {
        surface.set_field(id, "");
    }
}

/// Spinner in `container_id` until the response replaces it
pub(crate) fn show_pending(ctx: &Context<'_>, token: &NavigationToken, container_id: &str, message: &str) {
    ctx.nav
        .write_if_current(token, container_id, &fragments::processing(message), Vec::new());
}

/// Services a workflow handler works with
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub nav: &'a NavigationController,
    pub client: &'a BlockchainClient,
    pub auth: &'a AuthStore,
    pub notices: &'a Notifier,
    pub modals: &'a ModalHost,
    pub selection: &'a Selection,
}

impl<'a> Context<'a> {
    pub fn surface(&self) -> &'a dyn ContentSurface {
        self.nav.surface().as_ref()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::*;
    use crate::config::UiConfig;
    use crate::navigation::{ContentRegistry, MemorySurface};
    use crate::session::{MemoryStorage, Role, SessionStorage, SESSION_KEY};
    use crate::transport::mock::MockTransport;
    use crate::ui::NotificationCenter;

    /// Services wired to a mock backend and an in-memory surface
    pub struct Fixture {
        pub transport: Arc<MockTransport>,
        pub surface: Arc<MemorySurface>,
        pub nav: NavigationController,
        pub client: Arc<BlockchainClient>,
        pub auth: Arc<AuthStore>,
        pub notices: Notifier,
        pub modals: ModalHost,
        pub selection: Selection,
    }

    impl Fixture {
        pub fn new(transport: MockTransport, role: Option<Role>) -> Self {
            let transport = Arc::new(transport);
            let storage = Arc::new(MemoryStorage::new());
            if let Some(role) = role {
                let record = serde_json::json!({
                    "id": 3,
                    "username": "sam",
                    "email": "sam@lab.io",
                    "role": role.as_str(),
                    "token": "tok"
                });
                storage.set_item(SESSION_KEY, &record.to_string()).unwrap();
            }

            let auth = Arc::new(AuthStore::new(transport.clone(), storage));
            auth.restore();
            let client = Arc::new(BlockchainClient::new(transport.clone()));
            let surface = Arc::new(MemorySurface::new());
            let nav = NavigationController::new(
                surface.clone(),
                Arc::new(ContentRegistry::new()),
                auth.clone(),
                client.clone(),
                UiConfig::default(),
            );

            Self {
                notices: Notifier::new(NotificationCenter::default(), surface.clone()),
                modals: ModalHost::new(surface.clone()),
                selection: Selection::new(),
                transport,
                surface,
                nav,
                client,
                auth,
            }
        }

        pub fn ctx(&self) -> Context<'_> {
            Context {
                nav: &self.nav,
                client: &self.client,
                auth: &self.auth,
                notices: &self.notices,
                modals: &self.modals,
                selection: &self.selection,
            }
        }

        pub fn fill(&self, fields: &[(&str, &str)]) {
            for (id, value) in fields {
                self.surface.set_field(id, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_missing_fields() {
        let form = FormValues::new()
            .with("chemical-name", "Acetone")
            .with("chemical-rfid", "   ");

        let err = form
            .require(&["chemical-name", "chemical-rfid", "chemical-location"], "Please fill in all required fields")
            .unwrap_err();

        assert_eq!(err.to_string(), "Please fill in all required fields");
        match err {
            ValidationError::MissingFields { fields, .. } => {
                assert_eq!(fields, vec!["chemical-rfid", "chemical-location"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_values_are_trimmed() {
        let form = FormValues::new().with("movement-location", "  Dock 4 ");
        assert_eq!(form.get("movement-location"), Some("Dock 4"));
        assert_eq!(form.optional("movement-remarks"), None);
        assert_eq!(form.text("movement-remarks"), "");
    }
}
