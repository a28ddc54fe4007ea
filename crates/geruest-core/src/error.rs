//! Error types for the scaffolding planner

use std::path::PathBuf;
use thiserror::Error;

use crate::models::HeightDebug;

#[derive(Debug, Error)]
pub enum GeruestError {
    // Address / geometry errors
    #[error("Address not found: {query}")]
    AddressNotFound { query: String },

    #[error("No facade geometry loaded. Look up an address first")]
    GeometryMissing,

    #[error("Invalid footprint geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Facade {index} is not selectable for the current building")]
    InvalidFacadeIndex { index: usize },

    #[error("Select at least one facade")]
    NoFacadesSelected,

    // Backend errors
    #[error("Backend unavailable: {reason}. Try: {remediation}")]
    BackendUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Backend returned {status}: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("Backend reported '{status}': {message}")]
    DomainStatus {
        status: String,
        message: String,
        /// Diagnostic counters sent along with the status, if any
        debug: Option<HeightDebug>,
    },

    #[error("Request timed out after {after_secs}s")]
    Timeout { after_secs: u64 },

    #[error("Request cancelled: superseded by a newer request for {resource}")]
    Cancelled { resource: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeruestError {
    /// Single message suitable for a status banner.
    ///
    /// Transport details stay in the `Display` output and the logs; the banner
    /// only tells the user what failed and that the action can be re-run.
    pub fn user_message(&self) -> String {
        match self {
            GeruestError::AddressNotFound { query } => {
                format!("Keine Adresse gefunden für '{}'", query)
            }
            GeruestError::GeometryMissing => {
                "Keine Gebäudedaten geladen. Bitte zuerst eine Adresse suchen.".to_string()
            }
            GeruestError::InvalidFacadeIndex { index } => {
                format!("Fassade {} ist für dieses Gebäude nicht wählbar", index)
            }
            GeruestError::NoFacadesSelected => {
                "Bitte mindestens eine Fassade auswählen (select at least one facade)".to_string()
            }
            GeruestError::BackendUnavailable { .. } => {
                "Server nicht erreichbar. Bitte erneut versuchen.".to_string()
            }
            GeruestError::BackendStatus { status, .. } => {
                format!("Serverfehler ({}). Bitte erneut versuchen.", status)
            }
            GeruestError::DomainStatus { message, .. } => message.clone(),
            GeruestError::Timeout { after_secs } => {
                format!("Zeitüberschreitung nach {} Sekunden. Bitte erneut versuchen.", after_secs)
            }
            GeruestError::Cancelled { .. } => "Anfrage abgebrochen".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether re-running the same action could succeed without changing inputs.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeruestError::BackendUnavailable { .. }
                | GeruestError::BackendStatus { .. }
                | GeruestError::Timeout { .. }
        )
    }
}

impl From<serde_json::Error> for GeruestError {
    fn from(err: serde_json::Error) -> Self {
        GeruestError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeruestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_message_mentions_facade() {
        let msg = GeruestError::NoFacadesSelected.user_message();
        assert!(msg.contains("select at least one facade"));
    }

    #[test]
    fn test_domain_status_passes_message_through() {
        let err = GeruestError::DomainStatus {
            status: "no_tile_found".to_string(),
            message: "Keine Höhendaten-Kachel gefunden".to_string(),
            debug: None,
        };
        assert_eq!(err.user_message(), "Keine Höhendaten-Kachel gefunden");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_errors() {
        assert!(GeruestError::Timeout { after_secs: 120 }.is_transient());
        assert!(GeruestError::BackendStatus { status: 502, body: String::new() }.is_transient());
        assert!(!GeruestError::NoFacadesSelected.is_transient());
    }
}
