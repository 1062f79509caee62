//! Geolocation
//!
//! The position comes from the reporter's own device. The HTTP layer wraps whatever the
//! device reported (a fix or a denial) in a [`ReportedPosition`].

use async_trait::async_trait;
use wsw_common::Coordinates;

use super::ServiceError;

/// Single-shot position source
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, ServiceError>;
}

/// Position as reported by the client device
#[derive(Debug, Clone, PartialEq)]
pub enum ReportedPosition {
    Fix { latitude: f64, longitude: f64 },
    /// Permission denied, timeout or any other device-side failure
    Denied(String),
}

impl ReportedPosition {
    /// Build from the loose fields of a client request
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>, error: Option<String>) -> Self {
        match (latitude, longitude, error) {
            (_, _, Some(reason)) => ReportedPosition::Denied(reason),
            (Some(latitude), Some(longitude), None) => ReportedPosition::Fix { latitude, longitude },
            _ => ReportedPosition::Denied("no position reported".to_string()),
        }
    }
}

#[async_trait]
impl LocationProvider for ReportedPosition {
    async fn current_position(&self) -> Result<Coordinates, ServiceError> {
        match self {
            ReportedPosition::Fix { latitude, longitude } => Coordinates::new(*latitude, *longitude)
                .map_err(|e| ServiceError::Location(e.to_string())),
            ReportedPosition::Denied(reason) => Err(ServiceError::Location(reason.clone())),
        }
    }
}
