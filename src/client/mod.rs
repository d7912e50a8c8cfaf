//! Client side of the orphanage registration flow: the HTTP API client, the
//! geocoding lookup with its debouncer, and the creation form state machine.

pub mod api;
pub mod debounce;
pub mod form;
pub mod geocoding;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub use api::ApiClient;
pub use debounce::AddressLookup;
pub use form::{CreateOrphanageForm, FormState, OrphanageDraft, Position};
pub use geocoding::{AddressMatch, Geocoder, NominatimGeocoder};

/// Orphanage record as returned by the API.
pub type Orphanage = crate::entities::orphanage::Model;

/// JSON error body produced by the server's error handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        for (field, message) in &self.errors {
            write!(f, "; {} {}", field, message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("server responded with {status}: {body}")]
    Api { status: u16, body: ApiErrorBody },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_display_lists_fields() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"Validation failed","errors":{"name":"is required"}}"#,
        )
        .unwrap();
        assert_eq!(body.to_string(), "Validation failed; name is required");
    }

    #[test]
    fn test_error_body_without_fields() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"error":"Route not found"}"#).unwrap();
        assert!(body.errors.is_empty());
        assert_eq!(body.to_string(), "Route not found");
    }
}
