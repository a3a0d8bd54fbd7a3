//! Role Dashboard Content Generator
//!
//! Pure functions from (role, page key) to HTML fragments. Nothing here
//! touches the network or mutates state; the blockchain status is passed in
//! so status cards render with the last known values.
//!
//! All interpolated text is escaped by `maud`.

pub mod bindings;
pub mod fragments;
pub mod pages;
pub mod shell;

pub use bindings::{bindings_for, shell_bindings, Action, Binding};

use crate::blockchain::ConnectionStatus;
use crate::session::Role;

/// Page keys with a built-in template
pub const BUILTIN_PAGES: [&str; 8] = [
    "dashboard",
    "overview",
    "blockchain",
    "register",
    "track",
    "scan",
    "verify",
    "history",
];

pub fn is_builtin(page: &str) -> bool {
    BUILTIN_PAGES.contains(&page)
}

/// Heading for a page key; unknown keys are capitalized
pub fn page_title(page: &str) -> String {
    match page {
        "overview" => "Dashboard".to_string(),
        "blockchain" => "Blockchain Status".to_string(),
        "register" => "Register Chemical".to_string(),
        "track" => "Track Movement".to_string(),
        "verify" => "Verify Chemical".to_string(),
        _ => {
            let mut chars = page.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Content for `page`. Never empty: unknown keys get the "under development" card.
pub fn page_content(role: Option<Role>, page: &str, status: &ConnectionStatus) -> String {
    let markup = match page {
        "dashboard" | "overview" => pages::overview(role, status),
        "blockchain" => pages::blockchain(status),
        "register" => pages::register(),
        "track" => pages::track(),
        "scan" => pages::scan(),
        "verify" => pages::verify(),
        "history" => pages::history(),
        other => fragments::placeholder(other, &page_title(other)),
    };
    markup.into_string()
}
