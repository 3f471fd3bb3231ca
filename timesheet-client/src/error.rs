use reqwest::StatusCode;
use timesheet::{RuleViolation, TimeEntryId};

/// Failure of a gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("network error calling {call}: {source}")]
    Network {
        call: String,
        #[source]
        source: reqwest::Error,
    },
    /// 401. The session has already been cleared.
    #[error("unauthorized, log in again")]
    Unauthorized,
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("failed to parse {call} response: {message}")]
    Parse { call: String, message: String },
    #[error("invalid URL {0}")]
    InvalidUrl(String),
    #[error("session store error: {0}")]
    Session(#[from] anyhow::Error),
    /// Blocked before any request was sent.
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            GatewayError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Text to show the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Network { .. } => {
                "No se pudo conectar con el servidor. Intente nuevamente.".to_string()
            }
            GatewayError::Unauthorized => {
                "Su sesión expiró. Inicie sesión nuevamente.".to_string()
            }
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Parse { .. } => "Respuesta inesperada del servidor.".to_string(),
            GatewayError::InvalidUrl(url) => format!("URL inválida: {}", url),
            GatewayError::Session(err) => format!("Error de sesión: {}", err),
            GatewayError::Rule(rule) => rule.to_string(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A multi-entry save that stopped at its first failure. Entries in `created`
/// were saved before it.
#[derive(Debug, thiserror::Error)]
#[error("saved {} of {total} entries: {source}", .created.len())]
pub struct CreateEntriesError {
    pub created: Vec<TimeEntryId>,
    pub total: usize,
    #[source]
    pub source: GatewayError,
}
