use thiserror::Error;

use crate::{directions::DirectionsError, polyline::DecodeError};

/// Outcome kinds of the planning and charging engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("route unavailable: {0}")]
    RouteUnavailable(String),
}

impl From<DecodeError> for EngineError {
    fn from(err: DecodeError) -> Self {
        EngineError::RouteUnavailable(format!("could not decode route polyline: {err}"))
    }
}

impl From<DirectionsError> for EngineError {
    fn from(err: DirectionsError) -> Self {
        EngineError::RouteUnavailable(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}
