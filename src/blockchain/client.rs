//! Blockchain Status Client
//!
//! REST client for the traceability backend. The backend owns the smart
//! contract; this client only forwards requests and tracks the last known
//! connection status.

use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use super::error::ClientError;
use super::types::*;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

pub struct BlockchainClient {
    transport: Arc<dyn Transport>,
    status: watch::Sender<ConnectionStatus>,
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("status", &self.status.borrow().status)
            .finish()
    }
}

fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}

/// Backend message, or the generic HTTP status text
fn http_error_text(response: &HttpResponse) -> String {
    response
        .error_message()
        .unwrap_or_else(|| format!("HTTP error! Status: {}", response.status))
}

impl BlockchainClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::pending());
        Self {
            transport,
            status,
            token: RwLock::new(None),
        }
    }

    /// Bearer token attached to every request (set after login)
    pub fn set_auth_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.transport.send(request.with_bearer(token)).await
    }

    /// Last known status
    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    /// Receiver that sees every status update
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Query `/blockchain-status`. Failures become an `error` status; the
    /// cached status is updated either way.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let checked_at = Utc::now();
        let outcome = match self.send(HttpRequest::get("/blockchain-status")).await {
            Ok(response) => response.json::<StatusResponse>(),
            Err(e) => Err(e),
        };

        let status = match outcome {
            Ok(body) => ConnectionStatus::from_response(body, checked_at),
            Err(e) => {
                tracing::warn!(error = %e, "Error checking blockchain connection");
                ConnectionStatus::failed(e.to_string(), checked_at)
            }
        };

        tracing::debug!(status = status.status.as_str(), provider = %status.provider, "Blockchain status");
        self.status.send_replace(status.clone());
        status
    }

    pub async fn register_chemical(&self, chemical: &ChemicalRegistration) -> RegistrationResult {
        match self.try_register(chemical).await {
            Ok((data, confirmed)) => {
                tracing::info!(rfid = %chemical.rfid_tag, on_chain = confirmed, "Chemical registered");
                RegistrationResult {
                    success: true,
                    data: Some(data),
                    blockchain_status: confirmed,
                    message: "Chemical successfully registered".to_string(),
                }
            }
            Err(message) => {
                tracing::error!(rfid = %chemical.rfid_tag, %message, "Error registering chemical");
                RegistrationResult {
                    success: false,
                    data: None,
                    blockchain_status: false,
                    message: format!("Failed to register chemical: {}", message),
                }
            }
        }
    }

    async fn try_register(
        &self,
        chemical: &ChemicalRegistration,
    ) -> Result<(serde_json::Value, bool), String> {
        let request = HttpRequest::post("/register-chemical", chemical).map_err(|e| e.to_string())?;
        let response = self.send(request).await.map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(http_error_text(&response));
        }

        let data: serde_json::Value = response.json().map_err(|e| e.to_string())?;
        let ack: ChainAck = serde_json::from_value(data.clone()).unwrap_or_default();
        Ok((data, ack.confirmed()))
    }

    /// Log a movement. 201 is full success, 207 means stored locally but not
    /// recorded on chain, anything else is a failure.
    pub async fn log_event(&self, event: &MovementEvent) -> MovementResult {
        match self.try_log_event(event).await {
            Ok((status, data)) => {
                let partial = status == 207;
                let ack: ChainAck = serde_json::from_value(data.clone()).unwrap_or_default();
                if partial {
                    tracing::warn!(tag = %event.tag_id, "Movement stored locally, chain recording failed");
                } else {
                    tracing::info!(tag = %event.tag_id, location = %event.location, "Movement logged");
                }
                MovementResult {
                    success: true,
                    partial_success: partial,
                    blockchain_status: ack.confirmed(),
                    data: Some(data),
                    message: if partial {
                        "Event logged in local database, but blockchain recording failed".to_string()
                    } else {
                        "Event successfully logged with blockchain verification".to_string()
                    },
                }
            }
            Err(message) => {
                tracing::error!(tag = %event.tag_id, %message, "Error logging movement event");
                MovementResult {
                    success: false,
                    partial_success: false,
                    blockchain_status: false,
                    data: None,
                    message: format!("Failed to log movement event: {}", message),
                }
            }
        }
    }

    async fn try_log_event(&self, event: &MovementEvent) -> Result<(u16, serde_json::Value), String> {
        let request = HttpRequest::post("/log-event", event).map_err(|e| e.to_string())?;
        let response = self.send(request).await.map_err(|e| e.to_string())?;
        if response.status != 201 && response.status != 207 {
            return Err(http_error_text(&response));
        }

        // a 201/207 without a JSON body still counts
        let data = response.json().unwrap_or(serde_json::Value::Null);
        Ok((response.status, data))
    }

    /// Chain-verified history, falling back to the local database records
    pub async fn get_chemical_history(&self, tag_id: &str) -> HistoryResult {
        match self.try_history(tag_id).await {
            Ok(result) => result,
            Err(message) => {
                tracing::error!(tag = %tag_id, %message, "Error getting chemical history");
                HistoryResult {
                    success: false,
                    history: Vec::new(),
                    blockchain_enabled: false,
                    blockchain_error: None,
                    message: format!("Failed to get chemical history: {}", message),
                }
            }
        }
    }

    async fn try_history(&self, tag_id: &str) -> Result<HistoryResult, String> {
        let tag = segment(tag_id);

        let verified = self
            .send(HttpRequest::get(format!("/blockchain-verification/{}", tag)))
            .await;
        match verified {
            Ok(response) if response.is_success() => {
                let body: VerifiedHistoryResponse = response.json().map_err(|e| e.to_string())?;
                return Ok(HistoryResult {
                    success: true,
                    history: body.history,
                    blockchain_enabled: body.blockchain_enabled,
                    blockchain_error: body.blockchain_error,
                    message: body.message.unwrap_or_else(|| {
                        "Retrieved chemical history with blockchain verification".to_string()
                    }),
                });
            }
            Ok(response) => {
                tracing::debug!(tag = %tag_id, status = response.status, "Verified history unavailable, using local records");
            }
            Err(e) => {
                tracing::debug!(tag = %tag_id, error = %e, "Verified history unavailable, using local records");
            }
        }

        let response = self
            .send(HttpRequest::get(format!("/chemical-history/{}", tag)))
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(http_error_text(&response));
        }
        let body: LocalHistoryResponse = response.json().map_err(|e| e.to_string())?;

        Ok(HistoryResult {
            success: true,
            history: body.history,
            blockchain_enabled: false,
            blockchain_error: Some(
                "Blockchain verification unavailable, showing local database records only".to_string(),
            ),
            message: "Retrieved chemical history from local database".to_string(),
        })
    }

    pub async fn find_chemical(&self, rfid_tag: &str) -> Result<ChemicalRecord, ClientError> {
        let response = self
            .send(HttpRequest::get(format!("/api/chemicals/{}", segment(rfid_tag))))
            .await?;
        if !response.is_success() {
            return Err(ClientError::NotFound);
        }
        Ok(response.json()?)
    }

    pub async fn movement_history(&self, rfid_tag: &str) -> Result<Vec<MovementRecord>, ClientError> {
        let response = self
            .send(HttpRequest::get(format!("/api/movements/{}", segment(rfid_tag))))
            .await?;
        if !response.is_success() {
            return Err(ClientError::http(
                response.status,
                response.error_message(),
                "Error loading movement history.",
            ));
        }
        Ok(response.json()?)
    }

    pub async fn create_movement(&self, update: &LocationUpdate) -> Result<serde_json::Value, ClientError> {
        let response = self
            .send(HttpRequest::post("/api/movements/create", update)?)
            .await?;
        if !response.is_success() {
            return Err(ClientError::http(
                response.status,
                response.error_message(),
                "Failed to update location",
            ));
        }
        Ok(response.json().unwrap_or(serde_json::Value::Null))
    }

    pub async fn verify_chemical(&self, rfid_tag: &str) -> Result<VerificationResult, ClientError> {
        let response = self
            .send(HttpRequest::get(format!("/api/blockchain/verify/{}", segment(rfid_tag))))
            .await?;
        if !response.is_success() {
            return Err(ClientError::http(
                response.status,
                response.error_message(),
                "Error during blockchain verification.",
            ));
        }
        Ok(response.json()?)
    }
}
