//! Application Context
//!
//! Builds every service once, in a fixed order, and hands out references.
//! Nothing in the crate looks services up globally; handlers receive them
//! through [`App`] or a [`workflows::Context`].
//!
//! Initialization order:
//! 1. transport and session storage
//! 2. auth store (restores a persisted session)
//! 3. blockchain client and status poller
//! 4. content registry and built-in providers
//! 5. navigation controller
//! 6. notification and modal surfaces

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::blockchain::{BlockchainClient, StatusKind, StatusPoller};
use crate::config::Config;
use crate::dashboard::{pages, Action, Binding};
use crate::navigation::{
    route_from_hash, AppPhase, ContentRegistry, ContentSurface, MemorySurface, NavigationController,
    RenderError, RenderedPage,
};
use crate::session::{AuthStore, FileStorage, SessionStorage};
use crate::transport::{ReqwestTransport, Transport, TransportError};
use crate::ui::NotificationCenter;
use crate::workflows::{
    self, auth_forms, history, lookup, movement, registration, Context, ModalHost, Notifier,
    Selection,
};

pub const CONNECTION_WARNING: &str = "Failed to connect to blockchain. Some features may be limited.";

/// How often expired toasts are swept off the notification area
const NOTICE_SWEEP: Duration = Duration::from_millis(100);

pub struct App {
    config: Config,
    auth: Arc<AuthStore>,
    client: Arc<BlockchainClient>,
    poller: Arc<StatusPoller>,
    nav: Arc<NavigationController>,
    notices: Arc<Notifier>,
    modals: ModalHost,
    selection: Selection,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("backend", &self.config.backend.base_url)
            .field("nav", &self.nav)
            .finish()
    }
}

impl App {
    /// Production wiring: `reqwest` backend, file-backed session, in-memory surface
    pub fn new(config: Config) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(
            &config.backend.base_url,
            config.backend.request_timeout(),
        )?);
        let storage = Arc::new(FileStorage::new(&config.session.storage_path));
        Ok(Self::with_parts(
            config,
            transport,
            storage,
            Arc::new(MemorySurface::new()),
        ))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        surface: Arc<dyn ContentSurface>,
    ) -> Self {
        let view_surface = surface.clone();
        let auth = Arc::new(
            AuthStore::new(transport.clone(), storage)
                .with_view_callback(move |view| view_surface.show_view(view)),
        );
        let restored = auth.restore();

        let client = Arc::new(BlockchainClient::new(transport));
        client.set_auth_token(restored.map(|s| s.token));
        let poller = Arc::new(StatusPoller::new(
            client.clone(),
            config.status.poll_interval(),
        ));

        let registry = Arc::new(ContentRegistry::new());
        register_providers(&registry, &config);

        let nav = Arc::new(NavigationController::new(
            surface.clone(),
            registry,
            auth.clone(),
            client.clone(),
            config.ui.clone(),
        ));

        tracing::debug!(backend = %config.backend.base_url, "Services initialized");

        Self {
            notices: Arc::new(Notifier::new(
                NotificationCenter::from_config(&config.ui),
                surface.clone(),
            )),
            modals: ModalHost::new(surface),
            selection: Selection::new(),
            config,
            auth,
            client,
            poller,
            nav,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn client(&self) -> &Arc<BlockchainClient> {
        &self.client
    }

    pub fn nav(&self) -> &Arc<NavigationController> {
        &self.nav
    }

    pub fn surface(&self) -> &Arc<dyn ContentSurface> {
        self.nav.surface()
    }

    pub fn notices(&self) -> &Notifier {
        &self.notices
    }

    pub fn modals(&self) -> &ModalHost {
        &self.modals
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            nav: &self.nav,
            client: &self.client,
            auth: &self.auth,
            notices: &self.notices,
            modals: &self.modals,
            selection: &self.selection,
        }
    }

    /// Start the status poller, the task that pushes each result into the
    /// mounted page, and the toast sweeper. Calling it twice is a no-op.
    pub fn start_background(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            return;
        }

        let mut updates = self.client.subscribe();
        let nav = self.nav.clone();
        tasks.push(tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let status = updates.borrow_and_update().clone();
                let refreshed = nav.refresh_status(&status);
                tracing::trace!(refreshed, status = status.status.as_str(), "Status elements refreshed");
            }
        }));
        tasks.push(self.poller.clone().start());
        tasks.push(self.notices.clone().start_sweeper(NOTICE_SWEEP));
    }

    /// Initial connection check, splash, then the first screen. A restored
    /// session goes straight to `initial_hash` (or the dashboard).
    pub async fn boot(&self, initial_hash: Option<&str>) -> AppPhase {
        let status = self.client.check_connection().await;
        if status.status != StatusKind::Connected {
            tracing::warn!(status = status.status.as_str(), "Blockchain unavailable at startup");
            self.notices.warning(CONNECTION_WARNING);
        }

        self.nav.run_splash().await;

        if self.auth.is_authenticated() {
            let route = route_from_hash(initial_hash.unwrap_or_default());
            self.nav.navigate_to(&route, false);
        }

        tracing::info!(phase = ?self.nav.phase(), "Application ready");
        self.nav.phase()
    }

    /// Run whatever is bound to `element_id` on the current surface.
    /// Returns the action, or `None` when nothing listens on that id.
    pub async fn dispatch(&self, element_id: &str) -> Option<Action> {
        let Some(action) = self.surface().action_for(element_id) else {
            tracing::debug!(element_id, "No listener bound");
            return None;
        };
        let ctx = self.context();

        match &action {
            Action::Navigate(page) => {
                self.nav.navigate_to(page, true);
            }
            Action::GoBack => {
                self.nav.go_back();
            }
            Action::Logout => self.logout(),
            Action::ToggleUserMenu => {
                self.nav.toggle_user_menu();
            }
            Action::RefreshStatus => {
                let status = self.client.check_connection().await;
                self.nav.refresh_status(&status);
            }
            Action::SubmitRegistration => log_rejected(registration::submit(&ctx).await),
            Action::SubmitMovement => log_rejected(movement::submit(&ctx).await),
            Action::ScanTag => movement::scan_tag(&ctx),
            Action::FindChemical => log_rejected(lookup::find_chemical(&ctx).await),
            Action::UpdateLocation => log_rejected(lookup::update_location(&ctx).await),
            Action::VerifyOnChain => log_rejected(lookup::verify_selected(&ctx).await),
            Action::VerifyLookup => log_rejected(lookup::verify_lookup(&ctx).await),
            Action::LoadHistory => log_rejected(history::load(&ctx).await),
            Action::SelectRole(role) => self.nav.select_role(*role),
            Action::SubmitLogin => {
                if let Err(e) = auth_forms::login(&ctx).await {
                    tracing::debug!(error = %e, "Login not completed");
                }
            }
            Action::SubmitSignup => {
                if let Err(e) = auth_forms::signup(&ctx).await {
                    tracing::debug!(error = %e, "Signup not completed");
                }
            }
            Action::Modal(modal_action) => {
                self.modals.resolve(*modal_action);
            }
            Action::DismissNotification(id) => {
                self.notices.dismiss(*id);
            }
        }

        Some(action)
    }

    pub fn logout(&self) {
        self.client.set_auth_token(None);
        self.selection.clear();
        self.nav.logout();
    }

    /// Stop the poller and wait for background tasks
    pub async fn shutdown(&self) {
        self.poller.stop();
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for task in tasks {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Background task failed");
                }
            }
        }
        tracing::info!("Application stopped");
    }
}

fn log_rejected<T>(result: Result<T, workflows::ValidationError>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "Form rejected");
    }
}

/// Pages rendered by providers instead of the built-in templates
fn register_providers(registry: &ContentRegistry, config: &Config) {
    let backend_url = config.backend.base_url.clone();
    let poll_secs = config.status.poll_interval_secs;

    registry.register("settings", move |ctx| {
        let session = ctx
            .session
            .ok_or_else(|| RenderError::MissingData("signed-in user".to_string()))?;
        let html = pages::settings(session, &backend_url, poll_secs).into_string();
        Ok(RenderedPage::new(html).with_binding(Binding::new("back-to-dashboard-btn", Action::GoBack)))
    });
}
