//! Blockchain client data types
//!
//! Request bodies mirror the backend's JSON field names. Result records are
//! what the client hands back to the UI; HTTP failures are folded into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connection state of the blockchain backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Connected,
    Disconnected,
    Error,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Pending => "pending",
            StatusKind::Connected => "connected",
            StatusKind::Disconnected => "disconnected",
            StatusKind::Error => "error",
        }
    }
}

/// Body of `GET /blockchain-status`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub chain_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub status: StatusKind,
    pub connected: bool,
    pub provider: String,
    pub contract_address: String,
    pub chain_info: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::pending()
    }
}

impl ConnectionStatus {
    /// State before the first check completes
    pub fn pending() -> Self {
        Self {
            status: StatusKind::Pending,
            connected: false,
            provider: "Unknown".to_string(),
            contract_address: "Unknown".to_string(),
            chain_info: serde_json::Value::Object(Default::default()),
            message: None,
            last_checked_at: None,
        }
    }

    pub(crate) fn from_response(response: StatusResponse, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: if response.connected {
                StatusKind::Connected
            } else {
                StatusKind::Disconnected
            },
            connected: response.connected,
            provider: response.provider.unwrap_or_else(|| "Unknown".to_string()),
            contract_address: response
                .contract_address
                .unwrap_or_else(|| "Unknown".to_string()),
            chain_info: response
                .chain_info
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            message: None,
            last_checked_at: Some(checked_at),
        }
    }

    pub(crate) fn failed(message: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            status: StatusKind::Error,
            message: Some(message.into()),
            last_checked_at: Some(checked_at),
            ..Self::pending()
        }
    }

    /// `0x1234...abcdef` form for addresses longer than 12 characters
    pub fn short_contract_address(&self) -> String {
        abbreviate_address(&self.contract_address)
    }

    /// Sentence shown in the status line
    pub fn label(&self) -> String {
        match self.status {
            StatusKind::Pending => "Checking blockchain connection...".to_string(),
            StatusKind::Connected => format!("Connected to blockchain network ({})", self.provider),
            StatusKind::Disconnected => "Disconnected from blockchain network".to_string(),
            StatusKind::Error => format!(
                "Blockchain connection error: {}",
                self.message.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

pub fn abbreviate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        address.to_string()
    }
}

/// `POST /register-chemical` body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChemicalRegistration {
    pub name: String,
    pub rfid_tag: String,
    pub manufacturer: String,
    pub current_location: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub expiry_date: Option<String>,
    pub received_date: Option<String>,
    pub storage_condition: Option<String>,
    pub hazard_class: Option<String>,
    pub cas_number: Option<String>,
    pub batch_number: Option<String>,
    pub description: Option<String>,
}

/// Optional `{"blockchain": {"success": bool}}` part of write responses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChainAck {
    #[serde(default)]
    pub blockchain: Option<ChainFlag>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChainFlag {
    #[serde(default)]
    pub success: bool,
}

impl ChainAck {
    pub fn confirmed(&self) -> bool {
        self.blockchain.as_ref().is_some_and(|b| b.success)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationResult {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    /// Backend also recorded the chemical on chain
    pub blockchain_status: bool,
    pub message: String,
}

/// Movement state reported with a logged event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStatus {
    #[default]
    InTransit,
    Delivered,
    Received,
    InStorage,
    InUse,
    Disposed,
    Returned,
    Damaged,
    Lost,
}

impl MovementStatus {
    pub const FORM_CHOICES: [MovementStatus; 6] = [
        MovementStatus::InTransit,
        MovementStatus::Delivered,
        MovementStatus::Received,
        MovementStatus::InStorage,
        MovementStatus::InUse,
        MovementStatus::Disposed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::InTransit => "in_transit",
            MovementStatus::Delivered => "delivered",
            MovementStatus::Received => "received",
            MovementStatus::InStorage => "in_storage",
            MovementStatus::InUse => "in_use",
            MovementStatus::Disposed => "disposed",
            MovementStatus::Returned => "returned",
            MovementStatus::Damaged => "damaged",
            MovementStatus::Lost => "lost",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MovementStatus::InTransit => "In Transit",
            MovementStatus::Delivered => "Delivered",
            MovementStatus::Received => "Received",
            MovementStatus::InStorage => "In Storage",
            MovementStatus::InUse => "In Use",
            MovementStatus::Disposed => "Disposed",
            MovementStatus::Returned => "Returned",
            MovementStatus::Damaged => "Damaged",
            MovementStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MovementStatus {
    type Err = String;

    /// Accepts both `in_transit` and `In Transit`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "in_transit" => Ok(MovementStatus::InTransit),
            "delivered" => Ok(MovementStatus::Delivered),
            "received" => Ok(MovementStatus::Received),
            "in_storage" => Ok(MovementStatus::InStorage),
            "in_use" => Ok(MovementStatus::InUse),
            "disposed" => Ok(MovementStatus::Disposed),
            "returned" => Ok(MovementStatus::Returned),
            "damaged" => Ok(MovementStatus::Damaged),
            "lost" => Ok(MovementStatus::Lost),
            _ => Err(format!("Unknown movement status: {}", s)),
        }
    }
}

/// `POST /log-event` body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementEvent {
    pub tag_id: String,
    pub location: String,
    pub moved_by: String,
    pub purpose: String,
    pub status: MovementStatus,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementResult {
    pub success: bool,
    /// Stored locally but not recorded on chain (HTTP 207)
    pub partial_success: bool,
    pub blockchain_status: bool,
    pub data: Option<serde_json::Value>,
    pub message: String,
}

/// One row of a chemical's history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub moved_by: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Only present on chain-verified history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Body of `GET /blockchain-verification/{tag}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VerifiedHistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub blockchain_enabled: bool,
    #[serde(default)]
    pub blockchain_error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /chemical-history/{tag}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LocalHistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryResult {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
    pub blockchain_enabled: bool,
    pub blockchain_error: Option<String>,
    pub message: String,
}

/// `GET /api/chemicals/{rfid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rfid_tag: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Row of `GET /api/movements/{rfid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub from_location: Option<String>,
    #[serde(default)]
    pub to_location: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub verified: bool,
}

/// `POST /api/movements/create` body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub rfid_tag: String,
    pub from_location: String,
    pub to_location: String,
    pub purpose: String,
    pub remarks: String,
}

/// `GET /api/blockchain/verify/{rfid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub block_number: Option<u64>,
}
