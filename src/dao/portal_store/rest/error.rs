//! Error types shared by the REST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the hosted REST backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing portal store environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build portal store client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send portal store request to `{path}`")]
    RequestSend {
        /// Relative path of the endpoint.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The backend returned an unexpected status code.
    #[error("unexpected portal store response status {status} for `{path}`")]
    RequestStatus {
        /// Relative path of the endpoint.
        path: String,
        /// Returned HTTP status.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode portal store response for `{path}`")]
    DecodeResponse {
        /// Relative path of the endpoint.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// An RPC payload did not match the expected row shape.
    #[error("failed to decode RPC payload for `{path}`")]
    DecodeJson {
        /// Relative path of the endpoint.
        path: String,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// A write with `return=representation` came back without a row.
    #[error("portal store returned no row for `{path}`")]
    EmptyResponse {
        /// Relative path of the endpoint.
        path: String,
    },
    /// The `since` cutoff timestamp could not be formatted.
    #[error("failed to format trailing-window cutoff timestamp")]
    CutoffFormat {
        /// Underlying formatting failure.
        #[source]
        source: time::error::Format,
    },
}
