//! Session Types
//!
//! Roles, the persisted session record, and auth request bodies.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// User persona. Determines which dashboard and menu entries are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manufacturer,
    Distributor,
    Retailer,
    Customer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manufacturer,
        Role::Distributor,
        Role::Retailer,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manufacturer => "manufacturer",
            Role::Distributor => "distributor",
            Role::Retailer => "retailer",
            Role::Customer => "customer",
        }
    }

    /// Capitalized key, used in breadcrumbs ("Manufacturer Portal")
    pub fn title(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manufacturer => "Manufacturer",
            Role::Distributor => "Distributor",
            Role::Retailer => "Retailer",
            Role::Customer => "Customer",
        }
    }

    /// Heading on the auth sidebar
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            other => other.title(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::Admin => "fas fa-crown",
            Role::Manufacturer => "fas fa-industry",
            Role::Distributor => "fas fa-truck",
            Role::Retailer => "fas fa-store",
            Role::Customer => "fas fa-flask",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Access full system controls, manage users, view audit logs, and oversee the entire chemical traceability network.",
            Role::Manufacturer => "Register new chemicals, assign RFID tags, and initiate the supply chain with blockchain verification.",
            Role::Distributor => "Manage transportation logs, track chemical movement, and update blockchain records during transit.",
            Role::Retailer => "Receive stock from distributors and keep shelf records in step with the supply chain.",
            Role::Customer => "Receive and verify chemical deliveries, maintain compliance records, and manage inventory.",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manufacturer" => Ok(Role::Manufacturer),
            "distributor" => Ok(Role::Distributor),
            "retailer" => Ok(Role::Retailer),
            "customer" => Ok(Role::Customer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The signed-in identity, persisted as `{id, username, email, role, token}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub token: String,
}

impl Session {
    /// Username, or the local part of the email when no username is set
    pub fn display_name(&self) -> &str {
        if !self.username.trim().is_empty() {
            &self.username
        } else {
            self.email.split('@').next().unwrap_or_default()
        }
    }

    /// Avatar initial
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Signup request body
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Manufacturer".parse::<Role>().unwrap(), Role::Manufacturer);
        assert_eq!(" customer ".parse::<Role>().unwrap(), Role::Customer);
        assert!("auditor".parse::<Role>().is_err());
    }

    #[test]
    fn test_session_numeric_id() {
        let session: Session = serde_json::from_str(
            r#"{"id": 42, "username": "ana", "email": "ana@lab.io", "role": "distributor", "token": "t"}"#,
        )
        .unwrap();
        assert_eq!(session.id, "42");
        assert_eq!(session.role, Role::Distributor);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let session = Session {
            id: "1".into(),
            username: String::new(),
            email: "marie@chem.org".into(),
            role: Role::Admin,
            token: String::new(),
        };
        assert_eq!(session.display_name(), "marie");
        assert_eq!(session.initial(), "M");
    }
}
