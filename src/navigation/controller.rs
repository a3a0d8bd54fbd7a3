//! Navigation controller
//!
//! Owns the shell phase, the page back-stack and every content swap. Page
//! content comes from [`ContentRegistry::resolve`]: a registered provider,
//! the built-in template for the key, and finally the generic placeholder.
//! Resolution failures end up as an inline error panel; nothing escapes
//! `navigate_to`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::registry::{ContentRegistry, PageContext, RenderedPage};
use super::state::NavigationState;
use super::surface::ContentSurface;
use crate::blockchain::{BlockchainClient, ConnectionStatus};
use crate::config::UiConfig;
use crate::dashboard::bindings::{auth_bindings, role_selection_bindings};
use crate::dashboard::{self, fragments, pages, shell, Binding};
use crate::session::{is_public, normalize_route, AuthStore, Role, RouteDecision};
use crate::ui::ShellView;

pub const DEFAULT_PAGE: &str = "dashboard";
pub const CONTENT_ID: &str = "dashboard-content";

/// Route key for a location hash; empty means [`DEFAULT_PAGE`]
pub fn route_from_hash(hash: &str) -> String {
    match normalize_route(hash.trim()) {
        "" => DEFAULT_PAGE.to_string(),
        route => route.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppPhase {
    Splash,
    RoleSelection,
    Auth,
    Dashboard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Rendered(String),
    /// No session; the auth view is shown instead
    RequireAuth,
    Forbidden(String),
}

/// Captures the navigation generation when a request starts. A response
/// whose token is no longer current belongs to a page the user left.
#[derive(Debug, Clone)]
pub struct NavigationToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl NavigationToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

pub struct NavigationController {
    state: Mutex<NavigationState>,
    phase: Mutex<AppPhase>,
    selected_role: Mutex<Option<Role>>,
    generation: Arc<AtomicU64>,
    user_menu_open: AtomicBool,
    registry: Arc<ContentRegistry>,
    surface: Arc<dyn ContentSurface>,
    auth: Arc<AuthStore>,
    blockchain: Arc<BlockchainClient>,
    ui: UiConfig,
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("phase", &self.phase())
            .field("current_page", &self.current_page())
            .field("history", &self.history())
            .finish()
    }
}

impl NavigationController {
    pub fn new(
        surface: Arc<dyn ContentSurface>,
        registry: Arc<ContentRegistry>,
        auth: Arc<AuthStore>,
        blockchain: Arc<BlockchainClient>,
        ui: UiConfig,
    ) -> Self {
        Self {
            state: Mutex::new(NavigationState::new()),
            phase: Mutex::new(AppPhase::Splash),
            selected_role: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
            user_menu_open: AtomicBool::new(false),
            registry,
            surface,
            auth,
            blockchain,
            ui,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_phase(&self, phase: AppPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    pub fn current_page(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current_page()
            .map(str::to_string)
    }

    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history()
            .to_vec()
    }

    pub fn surface(&self) -> &Arc<dyn ContentSurface> {
        &self.surface
    }

    pub fn registry(&self) -> &Arc<ContentRegistry> {
        &self.registry
    }

    pub fn selected_role(&self) -> Option<Role> {
        *self.selected_role.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Role used for rendering: the session's, else the one picked on the role screen
    pub fn role(&self) -> Option<Role> {
        self.auth.role().or_else(|| self.selected_role())
    }

    pub fn begin_request(&self) -> NavigationToken {
        NavigationToken {
            generation: self.generation.load(Ordering::SeqCst),
            current: self.generation.clone(),
        }
    }

    fn advance(&self) -> NavigationToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationToken {
            generation,
            current: self.generation.clone(),
        }
    }

    /// Splash for `splash_ms`, fade for `fade_ms`, then role selection
    pub async fn run_splash(&self) {
        self.set_phase(AppPhase::Splash);
        self.surface.replace(ShellView::Splash.container_id(), &shell::splash(), Vec::new());
        self.surface.show_view(ShellView::Splash);

        tokio::time::sleep(Duration::from_millis(self.ui.splash_ms)).await;
        tracing::debug!("Splash fading out");
        tokio::time::sleep(Duration::from_millis(self.ui.fade_ms)).await;

        self.show_role_selection();
    }

    pub fn show_role_selection(&self) {
        self.set_phase(AppPhase::RoleSelection);
        self.render_view(ShellView::RoleSelection, &shell::role_selection(), role_selection_bindings());
    }

    pub fn select_role(&self, role: Role) {
        tracing::info!(role = %role, "Role selected");
        *self.selected_role.lock().unwrap_or_else(PoisonError::into_inner) = Some(role);
        self.show_auth();
    }

    pub fn show_auth(&self) {
        self.set_phase(AppPhase::Auth);
        self.render_view(ShellView::Auth, &shell::auth_view(self.role()), auth_bindings());
    }

    fn render_view(&self, view: ShellView, html: &str, bindings: Vec<Binding>) {
        if !self.surface.replace(view.container_id(), html, bindings) {
            tracing::warn!(container = view.container_id(), "Shell container missing");
        }
        self.surface.show_view(view);
    }

    /// After login or signup: fresh history, then the remembered route or the dashboard
    pub fn enter_dashboard(&self) -> NavigationOutcome {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).reset();
        let target = self
            .auth
            .take_redirect()
            .map(|r| route_from_hash(&r))
            .filter(|r| !is_public(r))
            .unwrap_or_else(|| DEFAULT_PAGE.to_string());
        self.navigate_to(&target, false)
    }

    pub fn logout(&self) {
        self.auth.logout();
        self.state.lock().unwrap_or_else(PoisonError::into_inner).reset();
        self.advance();
        self.user_menu_open.store(false, Ordering::SeqCst);
        tracing::info!("Logged out");
        self.show_auth();
    }

    /// Never fails. Missing containers are logged and skipped.
    pub fn navigate_to(&self, path: &str, add_to_history: bool) -> NavigationOutcome {
        let page = route_from_hash(path);

        if !self.auth.is_authenticated() && is_public(&page) {
            self.show_auth();
            return NavigationOutcome::RequireAuth;
        }

        match self.auth.guard(&page) {
            RouteDecision::Allow => {}
            RouteDecision::RequireAuth { remembered } => {
                tracing::debug!(%remembered, "Navigation requires login");
                self.show_auth();
                return NavigationOutcome::RequireAuth;
            }
            RouteDecision::Redirect(target) => {
                let target = route_from_hash(&target);
                let target = if is_public(&target) {
                    DEFAULT_PAGE.to_string()
                } else {
                    target
                };
                return self.navigate_to(&target, add_to_history);
            }
            RouteDecision::Forbidden => {
                self.visit(&page, add_to_history);
                self.mount_frame(&page);
                let denied = fragments::alert(
                    "danger",
                    "You do not have permission to access this page.",
                )
                .into_string();
                self.swap_content(&page, RenderedPage::new(denied));
                return NavigationOutcome::Forbidden(page);
            }
        }

        tracing::debug!(page = %page, add_to_history, "Navigating");
        self.visit(&page, add_to_history);
        self.load_page(&page);
        NavigationOutcome::Rendered(page)
    }

    /// Pop the back-stack. Returns false when there was nothing to go back to.
    pub fn go_back(&self) -> bool {
        let previous = self.state.lock().unwrap_or_else(PoisonError::into_inner).pop();
        match previous {
            Some(page) => {
                self.navigate_to(&page, false);
                true
            }
            None => {
                self.navigate_to(DEFAULT_PAGE, false);
                false
            }
        }
    }

    pub fn handle_hash_change(&self, hash: &str) -> NavigationOutcome {
        self.navigate_to(&route_from_hash(hash), true)
    }

    fn visit(&self, page: &str, add_to_history: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .visit(page, add_to_history);
        self.set_phase(AppPhase::Dashboard(page.to_string()));
    }

    /// Frame, loading placeholder, resolved content
    fn load_page(&self, page: &str) {
        let token = self.mount_frame(page);
        self.swap_content(page, RenderedPage::new(fragments::loading(page)));

        let session = self.auth.current_session();
        let status = self.blockchain.status();
        let rendered = self.registry.resolve(&PageContext {
            page,
            role: self.role(),
            session: session.as_ref(),
            status: &status,
        });

        if token.is_current() {
            self.swap_content(page, rendered);
        } else {
            tracing::debug!(page, "Discarding content for a page no longer shown");
        }
    }

    fn mount_frame(&self, page: &str) -> NavigationToken {
        let token = self.advance();
        let role = self.role();
        let session = self.auth.current_session();
        let status = self.blockchain.status();

        self.user_menu_open.store(false, Ordering::SeqCst);
        let frame = shell::dashboard_frame(role, session.as_ref(), &status, page, "");
        self.render_view(ShellView::Dashboard, &frame, dashboard::shell_bindings(role));
        token
    }

    fn swap_content(&self, page: &str, rendered: RenderedPage) -> bool {
        let swapped = self.surface.replace(CONTENT_ID, &rendered.html, rendered.bindings);
        if !swapped {
            tracing::warn!(page, container = CONTENT_ID, "Content container not found");
        }
        swapped
    }

    /// Write into a container only if `token` is still current and the
    /// container is mounted.
    pub fn write_if_current(
        &self,
        token: &NavigationToken,
        container_id: &str,
        html: &str,
        bindings: Vec<Binding>,
    ) -> bool {
        if !token.is_current() {
            tracing::debug!(container = container_id, "Dropping stale response");
            return false;
        }
        if !self.surface.replace(container_id, html, bindings) {
            tracing::debug!(container = container_id, "Target container not mounted");
            return false;
        }
        true
    }

    /// Update every mounted status element. Elements of other pages are skipped.
    pub fn refresh_status(&self, status: &ConnectionStatus) -> usize {
        let mut updated = 0;
        for (id, html) in pages::status_updates(status) {
            if self.surface.contains(id) && self.surface.replace(id, &html, Vec::new()) {
                updated += 1;
            }
        }
        updated
    }

    /// Returns the new open state
    pub fn toggle_user_menu(&self) -> bool {
        !self.user_menu_open.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn user_menu_open(&self) -> bool {
        self.user_menu_open.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Action;
    use crate::navigation::registry::RenderError;
    use crate::navigation::surface::MemorySurface;
    use crate::session::{MemoryStorage, SessionStorage, SESSION_KEY};
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    struct Harness {
        nav: NavigationController,
        surface: Arc<MemorySurface>,
        registry: Arc<ContentRegistry>,
        blockchain: Arc<BlockchainClient>,
    }

    fn harness_on(surface: MemorySurface, role: Option<Role>) -> Harness {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(role) = role {
            let record = json!({
                "id": "1",
                "username": "mara",
                "email": "mara@lab.io",
                "role": role.as_str(),
                "token": "tok"
            });
            storage.set_item(SESSION_KEY, &record.to_string()).unwrap();
        }

        let transport = Arc::new(MockTransport::new());
        let auth = Arc::new(AuthStore::new(transport.clone(), storage));
        auth.restore();

        let surface = Arc::new(surface);
        let registry = Arc::new(ContentRegistry::new());
        let blockchain = Arc::new(BlockchainClient::new(transport));
        let nav = NavigationController::new(
            surface.clone(),
            registry.clone(),
            auth,
            blockchain.clone(),
            UiConfig::default(),
        );
        Harness {
            nav,
            surface,
            registry,
            blockchain,
        }
    }

    fn harness(role: Option<Role>) -> Harness {
        harness_on(MemorySurface::new(), role)
    }

    fn content(h: &Harness) -> String {
        h.surface.content(CONTENT_ID).unwrap_or_default()
    }

    #[test]
    fn test_route_from_hash() {
        assert_eq!(route_from_hash("#track"), "track");
        assert_eq!(route_from_hash("/scan"), "scan");
        assert_eq!(route_from_hash(""), "dashboard");
        assert_eq!(route_from_hash("#"), "dashboard");
    }

    #[test]
    fn test_back_restores_previous_page() {
        let h = harness(Some(Role::Manufacturer));
        h.nav.navigate_to("dashboard", true);
        h.nav.navigate_to("register", true);
        assert_eq!(h.nav.history(), vec!["dashboard".to_string()]);

        assert!(h.nav.go_back());
        assert_eq!(h.nav.current_page().as_deref(), Some("dashboard"));
        assert!(h.nav.history().is_empty());
        assert_eq!(h.nav.phase(), AppPhase::Dashboard("dashboard".into()));
    }

    #[test]
    fn test_back_on_empty_history() {
        let h = harness(Some(Role::Customer));
        h.nav.navigate_to("verify", false);

        assert!(!h.nav.go_back());
        assert_eq!(h.nav.current_page().as_deref(), Some("dashboard"));
        assert!(h.nav.history().is_empty());
    }

    #[test]
    fn test_registered_provider_overrides_builtin() {
        let h = harness(Some(Role::Distributor));
        h.registry.register("track", |ctx: &PageContext<'_>| {
            Ok(RenderedPage::new(format!("<p>custom {}</p>", ctx.page)))
        });

        h.nav.navigate_to("track", true);
        assert!(content(&h).contains("custom track"));
        assert!(!content(&h).contains("submit-movement-btn"));
    }

    #[test]
    fn test_provider_error_becomes_error_panel() {
        let h = harness(Some(Role::Admin));
        h.registry.register("audit", |_ctx: &PageContext<'_>| {
            Err(RenderError::Provider("audit log offline".into()))
        });

        let outcome = h.nav.navigate_to("audit", true);
        assert_eq!(outcome, NavigationOutcome::Rendered("audit".into()));
        assert!(content(&h).contains("Error Loading Page"));
        assert!(content(&h).contains("audit log offline"));
    }

    #[test]
    fn test_provider_panic_becomes_error_panel() {
        let h = harness(Some(Role::Admin));
        h.registry.register("users", |_ctx: &PageContext<'_>| -> Result<RenderedPage, RenderError> {
            panic!("boom")
        });

        h.nav.navigate_to("users", true);
        assert!(content(&h).contains("Error Loading Page"));
    }

    #[test]
    fn test_unknown_page_placeholder() {
        let h = harness(Some(Role::Admin));
        h.nav.navigate_to("#reports", true);
        assert!(content(&h).contains("This reports functionality is under development."));
    }

    #[test]
    fn test_missing_container_is_noop() {
        let h = harness_on(MemorySurface::empty(), Some(Role::Manufacturer));
        let outcome = h.nav.navigate_to("register", true);
        assert_eq!(outcome, NavigationOutcome::Rendered("register".into()));
        assert_eq!(h.nav.current_page().as_deref(), Some("register"));
        assert!(!h.surface.contains(CONTENT_ID));
    }

    #[test]
    fn test_navigation_invalidates_tokens() {
        let h = harness(Some(Role::Customer));
        h.nav.navigate_to("verify", true);

        let token = h.nav.begin_request();
        assert!(token.is_current());
        assert!(h.nav.write_if_current(&token, "verify-result", "<p>ok</p>", vec![]));

        h.nav.navigate_to("history", true);
        assert!(!token.is_current());
        assert!(!h.nav.write_if_current(&token, "verify-result", "<p>late</p>", vec![]));
        assert!(!h.surface.contains("verify-result"));
    }

    #[test]
    fn test_bindings_follow_content() {
        let h = harness(Some(Role::Manufacturer));
        h.nav.navigate_to("register", true);
        assert_eq!(
            h.surface.action_for("submit-chemical-btn"),
            Some(Action::SubmitRegistration)
        );
        assert_eq!(
            h.surface.action_for("nav-dashboard"),
            Some(Action::Navigate("dashboard".into()))
        );

        h.nav.navigate_to("track", true);
        assert_eq!(h.surface.action_for("submit-chemical-btn"), None);
        assert_eq!(
            h.surface.action_for("submit-movement-btn"),
            Some(Action::SubmitMovement)
        );
    }

    #[test]
    fn test_unauthenticated_navigation_shows_auth() {
        let h = harness(None);
        let outcome = h.nav.navigate_to("track", true);
        assert_eq!(outcome, NavigationOutcome::RequireAuth);
        assert_eq!(h.nav.phase(), AppPhase::Auth);
        assert_eq!(h.surface.visible_view(), Some(ShellView::Auth));
        assert_eq!(h.nav.current_page(), None);
    }

    #[test]
    fn test_forbidden_route() {
        let h = harness(Some(Role::Customer));
        let outcome = h.nav.navigate_to("manufacturer/inventory", true);
        assert_eq!(outcome, NavigationOutcome::Forbidden("manufacturer/inventory".into()));
        assert!(content(&h).contains("You do not have permission"));
    }

    #[test]
    fn test_public_path_redirects_signed_in_user() {
        let h = harness(Some(Role::Distributor));
        let outcome = h.nav.navigate_to("#login", true);
        assert_eq!(outcome, NavigationOutcome::Rendered("dashboard".into()));
    }

    #[test]
    fn test_logout_resets_navigation() {
        let h = harness(Some(Role::Manufacturer));
        h.nav.navigate_to("dashboard", true);
        h.nav.navigate_to("register", true);

        h.nav.logout();
        assert!(h.nav.history().is_empty());
        assert_eq!(h.nav.current_page(), None);
        assert_eq!(h.nav.phase(), AppPhase::Auth);
        assert_eq!(h.surface.visible_view(), Some(ShellView::Auth));
    }

    #[test]
    fn test_select_role_renders_auth_view() {
        let h = harness(None);
        h.nav.select_role(Role::Distributor);
        assert_eq!(h.nav.role(), Some(Role::Distributor));
        assert_eq!(h.nav.phase(), AppPhase::Auth);
        assert_eq!(h.surface.action_for("signup-btn"), Some(Action::SubmitSignup));
        let html = h.surface.content("auth-container").unwrap();
        assert!(html.contains("Distributor"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_splash_moves_to_role_selection() {
        let h = harness(None);
        h.nav.run_splash().await;
        assert_eq!(h.nav.phase(), AppPhase::RoleSelection);
        assert_eq!(h.surface.visible_view(), Some(ShellView::RoleSelection));
        assert_eq!(
            h.surface.action_for("role-card-manufacturer"),
            Some(Action::SelectRole(Role::Manufacturer))
        );
    }

    #[test]
    fn test_refresh_status_updates_mounted_elements() {
        let h = harness(Some(Role::Admin));
        h.nav.navigate_to("blockchain", true);

        let mut status = h.blockchain.status();
        status.provider = "Hardhat <local>".into();
        let updated = h.nav.refresh_status(&status);

        assert!(updated >= 3);
        let provider = h.surface.content("blockchain-provider").unwrap();
        assert_eq!(provider, "Hardhat &lt;local&gt;");
        assert!(h.surface.contains("header-blockchain-status"));
    }

    #[test]
    fn test_user_menu_toggle() {
        let h = harness(Some(Role::Admin));
        assert!(h.nav.toggle_user_menu());
        assert!(h.nav.user_menu_open());
        assert!(!h.nav.toggle_user_menu());
    }
}
