//! Blockchain Status Client
//!
//! REST access to the traceability backend: connection status, chemical
//! registration, movement logging, history and lookups.

pub mod client;
pub mod error;
pub mod poller;
pub mod types;

pub use client::BlockchainClient;
pub use error::ClientError;
pub use poller::StatusPoller;
pub use types::{
    abbreviate_address, ChemicalRecord, ChemicalRegistration, ConnectionStatus, HistoryEntry,
    HistoryResult, LocationUpdate, MovementEvent, MovementRecord, MovementResult, MovementStatus,
    RegistrationResult, StatusKind, VerificationResult,
};
