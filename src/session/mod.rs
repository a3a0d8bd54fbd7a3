//! Auth Session Store
//!
//! Login/signup against the backend, per-tab persistence of the session
//! record, and role-based route protection.

pub mod access;
pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use access::{can_access, is_public, normalize_route, PUBLIC_PATHS};
pub use error::AuthError;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, REDIRECT_KEY, SESSION_KEY};
pub use store::{AuthStore, RoleSet, RouteDecision, ViewCallback};
pub use types::{Credentials, Role, Session, SignupRequest, UnknownRole};
