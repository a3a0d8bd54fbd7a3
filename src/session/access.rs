//! Route access rules

use super::types::Role;

/// Paths reachable without a session
pub const PUBLIC_PATHS: [&str; 3] = ["login", "signup", "forgot-password"];

/// Path prefix -> roles allowed. Paths matching no prefix are open to any signed-in user.
const ROUTE_PERMISSIONS: [(&str, &[Role]); 5] = [
    ("admin", &[Role::Admin]),
    ("manufacturer", &[Role::Admin, Role::Manufacturer]),
    ("distributor", &[Role::Admin, Role::Distributor]),
    ("retailer", &[Role::Admin, Role::Retailer]),
    ("customer", &[Role::Admin, Role::Customer]),
];

/// Strip leading `#` and `/` in any order so `#/track`, `/#track` and `track` are the same route
pub fn normalize_route(path: &str) -> &str {
    path.trim().trim_start_matches(['#', '/'])
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&normalize_route(path))
}

/// Roles allowed on `path`, or `None` when no prefix matches
pub fn allowed_roles(path: &str) -> Option<&'static [Role]> {
    let route = normalize_route(path);
    ROUTE_PERMISSIONS
        .iter()
        .find(|(prefix, _)| route.starts_with(prefix))
        .map(|(_, roles)| *roles)
}

/// Whether a user with `role` may open `path`
pub fn can_access(role: Option<Role>, path: &str) -> bool {
    let Some(role) = role else {
        return false;
    };
    match allowed_roles(path) {
        Some(roles) => roles.contains(&role),
        None => true,
    }
}
