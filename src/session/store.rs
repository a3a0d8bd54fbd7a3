//! Auth Session Store
//!
//! Holds the signed-in [`Session`], persists it to [`SessionStorage`] and
//! decides which route the shell may show. View changes (auth form vs.
//! dashboard) are reported through a caller-supplied callback.

use std::sync::{Arc, PoisonError, RwLock};

use super::access::{can_access, is_public, normalize_route};
use super::error::AuthError;
use super::storage::{SessionStorage, REDIRECT_KEY, SESSION_KEY};
use super::types::{Credentials, Role, Session, SignupRequest};
use crate::transport::{HttpRequest, Transport};
use crate::ui::ShellView;

pub type ViewCallback = Box<dyn Fn(ShellView) + Send + Sync>;

/// Anything `has_role` can check against: one role or a set of them
pub trait RoleSet {
    fn contains_role(&self, role: Role) -> bool;
}

impl RoleSet for Role {
    fn contains_role(&self, role: Role) -> bool {
        *self == role
    }
}

impl RoleSet for [Role] {
    fn contains_role(&self, role: Role) -> bool {
        self.contains(&role)
    }
}

impl<const N: usize> RoleSet for [Role; N] {
    fn contains_role(&self, role: Role) -> bool {
        self.contains(&role)
    }
}

impl RoleSet for Vec<Role> {
    fn contains_role(&self, role: Role) -> bool {
        self.contains(&role)
    }
}

/// Outcome of checking a requested route against the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// No session; the route was remembered for after login
    RequireAuth { remembered: String },
    /// Signed-in user opened an auth page; go here instead
    Redirect(String),
    /// Signed in, but the role may not open this route
    Forbidden,
}

pub struct AuthStore {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
    on_view: Option<ViewCallback>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("current", &self.current_session())
            .finish()
    }
}

impl AuthStore {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            transport,
            storage,
            current: RwLock::new(None),
            on_view: None,
        }
    }

    /// Register the callback that shows/hides the shell containers
    pub fn with_view_callback(mut self, callback: impl Fn(ShellView) + Send + Sync + 'static) -> Self {
        self.on_view = Some(Box::new(callback));
        self
    }

    fn show(&self, view: ShellView) {
        if let Some(callback) = &self.on_view {
            callback(view);
        }
    }

    fn set_current(&self, session: Option<Session>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    /// Restore a persisted session. A record that fails to parse is removed;
    /// this never fails.
    pub fn restore(&self) -> Option<Session> {
        let stored = match self.storage.get_item(SESSION_KEY) {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored session");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&stored) {
            Ok(session) => {
                tracing::info!(user = %session.display_name(), role = %session.role, "User session restored");
                self.set_current(Some(session.clone()));
                Some(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupted session record");
                if let Err(e) = self.storage.remove_item(SESSION_KEY) {
                    tracing::warn!(error = %e, "Could not remove corrupted session record");
                }
                self.set_current(None);
                None
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let request = HttpRequest::post("/api/auth/login", credentials)?;
        self.authenticate(request).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<Session, AuthError> {
        let request = HttpRequest::post("/api/auth/signup", request)?;
        self.authenticate(request).await
    }

    async fn authenticate(&self, request: HttpRequest) -> Result<Session, AuthError> {
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            tracing::warn!(path = %path, status = response.status, "Authentication rejected");
            return Err(match response.error_message() {
                Some(message) => AuthError::Rejected(message),
                None => AuthError::InvalidCredentials,
            });
        }

        let session: Session = response.json()?;
        self.storage
            .set_item(SESSION_KEY, &serde_json::to_string(&session).map_err(super::storage::StorageError::from)?)?;
        self.set_current(Some(session.clone()));

        tracing::info!(user = %session.display_name(), role = %session.role, "Signed in");
        self.show(ShellView::Dashboard);
        Ok(session)
    }

    /// Clear the session and show the auth view
    pub fn logout(&self) {
        self.set_current(None);
        if let Err(e) = self.storage.remove_item(SESSION_KEY) {
            tracing::warn!(error = %e, "Could not remove stored session");
        }
        tracing::info!("Signed out");
        self.show(ShellView::Auth);
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.role)
    }

    pub fn has_role<R: RoleSet + ?Sized>(&self, required: &R) -> bool {
        self.role().is_some_and(|role| required.contains_role(role))
    }

    pub fn can_access_route(&self, path: &str) -> bool {
        can_access(self.role(), path)
    }

    /// `Bearer <token>` for authenticated backend calls
    pub fn auth_header(&self) -> Option<String> {
        self.current_session()
            .filter(|s| !s.token.is_empty())
            .map(|s| format!("Bearer {}", s.token))
    }

    pub fn token(&self) -> Option<String> {
        self.current_session()
            .map(|s| s.token)
            .filter(|t| !t.is_empty())
    }

    /// Check a requested route. An empty path means `dashboard`.
    pub fn guard(&self, path: &str) -> RouteDecision {
        let route = match normalize_route(path) {
            "" => "dashboard",
            route => route,
        };
        let public = is_public(route);

        if !self.is_authenticated() {
            if public {
                return RouteDecision::Allow;
            }
            if let Err(e) = self.storage.set_item(REDIRECT_KEY, route) {
                tracing::warn!(error = %e, "Could not remember requested route");
            }
            tracing::debug!(route, "Route requires authentication");
            self.show(ShellView::Auth);
            return RouteDecision::RequireAuth {
                remembered: route.to_string(),
            };
        }

        if public {
            let target = self.take_redirect().unwrap_or_else(|| "dashboard".to_string());
            self.show(ShellView::Dashboard);
            return RouteDecision::Redirect(target);
        }

        if !self.can_access_route(route) {
            tracing::warn!(route, role = ?self.role(), "Route forbidden for role");
            return RouteDecision::Forbidden;
        }

        RouteDecision::Allow
    }

    /// Consume the route remembered before login
    pub fn take_redirect(&self) -> Option<String> {
        let remembered = self.storage.get_item(REDIRECT_KEY).ok().flatten()?;
        if let Err(e) = self.storage.remove_item(REDIRECT_KEY) {
            tracing::warn!(error = %e, "Could not clear remembered route");
        }
        Some(remembered).filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use crate::transport::mock::MockTransport;
    use crate::transport::Method;
    use serde_json::json;
    use std::sync::Mutex;

    fn login_ok() -> MockTransport {
        MockTransport::new().respond(
            Method::Post,
            "/api/auth/login",
            200,
            json!({"id": 7, "username": "mara", "email": "mara@lab.io", "role": "manufacturer", "token": "tok"}),
        )
    }

    fn store_with(transport: MockTransport) -> (AuthStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::new(transport), storage.clone());
        (store, storage)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let (store, storage) = store_with(login_ok());

        let session = store.login(&Credentials::new("mara", "secret")).await.unwrap();
        assert_eq!(session.id, "7");
        assert!(store.is_authenticated());
        assert!(store.has_role(&Role::Manufacturer));
        assert!(store.has_role(&[Role::Admin, Role::Manufacturer]));
        assert!(!store.has_role(&Role::Admin));
        assert_eq!(store.auth_header().as_deref(), Some("Bearer tok"));

        let stored = storage.get_item(SESSION_KEY).unwrap().unwrap();
        let parsed: Session = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed.email, "mara@lab.io");
    }

    #[tokio::test]
    async fn test_login_failure_uses_server_message() {
        let transport = MockTransport::new().respond(
            Method::Post,
            "/api/auth/login",
            401,
            json!({"message": "Account locked"}),
        );
        let (store, _) = store_with(transport);

        let err = store.login(&Credentials::new("x", "y")).await.unwrap_err();
        assert_eq!(err.to_string(), "Account locked");
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_without_message() {
        let transport = MockTransport::new().respond(Method::Post, "/api/auth/login", 401, json!({}));
        let (store, _) = store_with(transport);

        let err = store.login(&Credentials::new("x", "y")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_restore_corrupted_record() {
        let (store, storage) = store_with(MockTransport::new());
        storage.set_item(SESSION_KEY, "{not json").unwrap();

        assert!(store.restore().is_none());
        assert!(!store.is_authenticated());
        assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
    }

    #[test]
    fn test_restore_valid_record() {
        let (store, storage) = store_with(MockTransport::new());
        storage
            .set_item(
                SESSION_KEY,
                r#"{"id":"3","username":"dee","email":"dee@x.io","role":"customer","token":"t"}"#,
            )
            .unwrap();

        let session = store.restore().unwrap();
        assert_eq!(session.role, Role::Customer);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_shows_auth_view() {
        let views = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&views);
        let storage = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::new(login_ok()), storage.clone())
            .with_view_callback(move |v| seen.lock().unwrap().push(v));

        store.login(&Credentials::new("mara", "secret")).await.unwrap();
        store.logout();

        assert!(!store.is_authenticated());
        assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
        assert_eq!(
            *views.lock().unwrap(),
            vec![ShellView::Dashboard, ShellView::Auth]
        );
    }

    #[tokio::test]
    async fn test_guard_remembers_route_for_one_redirect() {
        let (store, _) = store_with(login_ok());

        assert_eq!(
            store.guard("#track"),
            RouteDecision::RequireAuth {
                remembered: "track".to_string()
            }
        );
        assert_eq!(store.guard("#login"), RouteDecision::Allow);

        store.login(&Credentials::new("mara", "secret")).await.unwrap();
        assert_eq!(store.guard("#login"), RouteDecision::Redirect("track".to_string()));
        assert_eq!(store.guard("#login"), RouteDecision::Redirect("dashboard".to_string()));
    }

    #[tokio::test]
    async fn test_guard_role_table() {
        let (store, _) = store_with(login_ok());
        store.login(&Credentials::new("mara", "secret")).await.unwrap();

        assert_eq!(store.guard("manufacturer/inventory"), RouteDecision::Allow);
        assert_eq!(store.guard("admin"), RouteDecision::Forbidden);
        // no prefix rule: open to every signed-in role
        assert_eq!(store.guard("reports"), RouteDecision::Allow);
        assert_eq!(store.guard(""), RouteDecision::Allow);
    }
}
