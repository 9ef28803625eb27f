//! Error taxonomy for API calls.

/// Errors returned by [`Client`](crate::Client) calls.
#[derive(Debug)]
pub enum ApiError {
    /// Input rejected locally before any request was made.
    Validation(String),
    /// Invalid client configuration.
    Config(String),
    /// Every attempt failed at the transport level.
    Unreachable { attempts: u32 },
    /// The service responded but the body was not valid JSON.
    Decode {
        status: u16,
        source: serde_json::Error,
    },
    /// The request body could not be compressed.
    Compression(std::io::Error),
}

impl ApiError {
    /// True when no attempt reached the service.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            ApiError::Unreachable { attempts } => {
                write!(
                    f,
                    "UniSender API unreachable after {} attempt(s) on both hosts",
                    attempts
                )
            }
            ApiError::Decode { status, source } => {
                write!(
                    f,
                    "Failed to decode JSON response (HTTP {}): {}",
                    status, source
                )
            }
            ApiError::Compression(e) => write!(f, "Failed to compress request body: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Decode { source, .. } => Some(source),
            ApiError::Compression(e) => Some(e),
            _ => None,
        }
    }
}
