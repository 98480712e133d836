use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Transport mode quoted and booked with a carrier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMode {
    Air,
    Surface,
}

impl fmt::Display for ShippingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingMode::Air => write!(f, "air"),
            ShippingMode::Surface => write!(f, "surface"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShipmentRequest {
    pub shipment_id: Uuid,
    pub provider_id: Uuid,
    pub courier_code: Option<String>,
    pub weight_kg: f64,
    pub from_pincode: String,
    pub to_pincode: String,
    pub dimensions: Option<PackageDimensions>,
}

/// Successful booking: the carrier issued an air waybill number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub awb: String,
    pub tracking_url: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub status: String,
    pub location: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

/// Provider calls are slow and failure-prone; the error type carries the
/// retry classification so callers can bound their retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CarrierError {
    #[error("carrier request timed out: {0}")]
    Timeout(String),

    #[error("carrier temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("carrier rejected the request: {0}")]
    Rejected(String),
}

impl CarrierError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CarrierError::Timeout(_) | CarrierError::Unavailable(_))
    }
}

/// External carrier integration. None of these calls are idempotent on the
/// provider side, which is why retries against them are bounded.
#[async_trait]
pub trait CarrierClient: Send + Sync {
    async fn create_shipment(
        &self,
        request: &CreateShipmentRequest,
    ) -> Result<BookingConfirmation, CarrierError>;

    async fn cancel_shipment(&self, awb: &str, provider_id: Uuid) -> Result<(), CarrierError>;

    async fn track_shipment(
        &self,
        awb: &str,
        provider_id: Uuid,
    ) -> Result<TrackingUpdate, CarrierError>;
}

/// Scriptable carrier used in tests and local runs. Outcomes can be queued
/// per shipment id; unscripted shipments book successfully with a generated
/// AWB.
pub struct MockCarrier {
    outcomes: Mutex<HashMap<Uuid, VecDeque<Result<BookingConfirmation, CarrierError>>>>,
    create_calls: AtomicU32,
}

impl MockCarrier {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            create_calls: AtomicU32::new(0),
        }
    }

    /// Queue outcomes for a shipment; they are consumed one per attempt.
    pub fn script(
        &self,
        shipment_id: Uuid,
        outcomes: Vec<Result<BookingConfirmation, CarrierError>>,
    ) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(shipment_id, outcomes.into());
    }

    pub fn create_call_count(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCarrier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CarrierClient for MockCarrier {
    async fn create_shipment(
        &self,
        request: &CreateShipmentRequest,
    ) -> Result<BookingConfirmation, CarrierError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .outcomes
            .lock()
            .unwrap()
            .get_mut(&request.shipment_id)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(outcome) => outcome,
            None => Ok(BookingConfirmation {
                awb: format!("AWB-{}", &request.shipment_id.simple().to_string()[..8]),
                tracking_url: Some(format!(
                    "https://track.example.com/{}",
                    request.shipment_id.simple()
                )),
                raw: serde_json::json!({ "mock": true }),
            }),
        }
    }

    async fn cancel_shipment(&self, _awb: &str, _provider_id: Uuid) -> Result<(), CarrierError> {
        Ok(())
    }

    async fn track_shipment(
        &self,
        awb: &str,
        _provider_id: Uuid,
    ) -> Result<TrackingUpdate, CarrierError> {
        Ok(TrackingUpdate {
            status: "IN_TRANSIT".to_string(),
            location: Some(format!("hub for {awb}")),
            last_update: Some(Utc::now()),
        })
    }
}
