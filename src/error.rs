//! Error handling.

use axum::{
    extract::rejection::PathRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use strum_macros::Display;
use thiserror::Error;
use tokio::sync::AcquireError;
use tracing::{event, Level};

use crate::types::IsoDateError;

/// Climate API error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant maps to one [ErrorKind], which decides the API error response.
#[derive(Debug, Error)]
pub enum ClimateApiError {
    /// Error expanding the configured database path
    #[error("failed to resolve climate store path {path}")]
    StorePath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error opening a connection to the climate store
    #[error("failed to open climate store at {path}")]
    StoreOpen {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Error executing a query against the climate store
    #[error("error querying climate store")]
    StoreQuery(#[from] rusqlite::Error),

    /// The climate store does not provide a table or column this service reads
    #[error("climate store table {table} is missing column {column}")]
    SchemaMismatch {
        table: &'static str,
        column: &'static str,
    },

    /// An aggregate query expected at least one row and found none
    #[error("no data available for {query}")]
    NoData { query: &'static str },

    /// A date held in the climate store could not be parsed
    #[error("invalid date {value} in climate store")]
    StoredDate {
        value: String,
        #[source]
        source: IsoDateError,
    },

    /// Error extracting parameters from the request path
    #[error("request path is not valid")]
    PathRejection(#[from] PathRejection),

    /// Error validating request path parameters
    #[error("request path is not valid")]
    PathValidation(#[from] validator::ValidationErrors),

    /// Error acquiring a semaphore
    #[error("error acquiring resources")]
    SemaphoreAcquireError(#[from] AcquireError),

    /// Error joining a blocking query task
    #[error("query task failed")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Kind of error, reported to API clients in the `error` field of the body.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The store could not be reached, queried, or does not match the declared schema.
    StoreUnavailable,
    /// An aggregate query found no rows.
    NoDataAvailable,
    /// A request parameter was rejected.
    InvalidParameter,
    /// Any other server-side failure.
    Internal,
}

impl ClimateApiError {
    /// Returns the [ErrorKind] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StorePath { .. }
            | Self::StoreOpen { .. }
            | Self::StoreQuery(_)
            | Self::SchemaMismatch { .. } => ErrorKind::StoreUnavailable,
            Self::NoData { .. } => ErrorKind::NoDataAvailable,
            Self::PathRejection(_) | Self::PathValidation(_) => ErrorKind::InvalidParameter,
            Self::StoredDate { .. } | Self::SemaphoreAcquireError(_) | Self::TaskJoin(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl IntoResponse for ClimateApiError {
    /// Convert from a `ClimateApiError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Kind of error
    error: ErrorKind,

    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new(error: &ClimateApiError) -> Self {
        let message = error.to_string();
        let mut caused_by: Option<Vec<String>> = None;
        let mut current = error.source();
        while let Some(source) = current {
            caused_by
                .get_or_insert_with(Vec::new)
                .push(source.to_string());
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody {
            error: error.kind(),
            message,
            caused_by,
        }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    #[serde(flatten)]
    body: ErrorBody,
}

impl From<ClimateApiError> for ErrorResponse {
    /// Convert from a `ClimateApiError` into an `ErrorResponse`.
    fn from(error: ClimateApiError) -> Self {
        let status = match error.kind() {
            ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorKind::StoreUnavailable | ErrorKind::NoDataAvailable | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let response = ErrorResponse {
            status,
            body: ErrorBody::new(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
