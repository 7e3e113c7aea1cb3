use std::fmt;

use crate::store::Action;

// =========================================================
// 网关错误 (Gateway Errors)
// =========================================================

/// Failure of a single gateway exchange.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, CORS...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },

    /// The request body could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// The server-supplied message carried by a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

// =========================================================
// 错误状态枚举
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The action needs a session token and none is present.
    Unauthenticated,
    /// The gateway could not reach the backend.
    Transport,
    /// The backend rejected the request.
    Rejected,
    /// The request or the response could not be (de)serialized.
    Decode,
}

impl StoreErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreErrorKind::Unauthenticated => "UNAUTHENTICATED",
            StoreErrorKind::Transport => "TRANSPORT_ERROR",
            StoreErrorKind::Rejected => "REQUEST_REJECTED",
            StoreErrorKind::Decode => "PAYLOAD_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// Error returned by a store action.
///
/// `message` is the text committed to the shared `error` field: the server's
/// message when the failure carried one, otherwise the action's default.
#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub action: Action,
    pub message: String,
    source: Option<GatewayError>,
}

impl StoreError {
    pub fn unauthenticated(action: Action) -> Self {
        Self {
            kind: StoreErrorKind::Unauthenticated,
            action,
            message: action.failure_message().to_string(),
            source: None,
        }
    }

    pub fn from_gateway(action: Action, error: GatewayError) -> Self {
        let kind = match &error {
            GatewayError::Transport(_) => StoreErrorKind::Transport,
            GatewayError::Status { .. } => StoreErrorKind::Rejected,
            GatewayError::Encode(_) | GatewayError::Decode(_) => StoreErrorKind::Decode,
        };
        let message = error
            .server_message()
            .unwrap_or(action.failure_message())
            .to_string();
        Self {
            kind,
            action,
            message,
            source: Some(error),
        }
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The gateway failure behind this error, if it came from the gateway.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        self.source.as_ref()
    }

    /// HTTP status of a rejected request.
    pub fn status_code(&self) -> Option<u16> {
        match &self.source {
            Some(GatewayError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | action: {}",
            self.error_code(),
            self.message,
            self.action.name()
        )?;
        if let Some(source) = &self.source {
            write!(f, " | cause: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
