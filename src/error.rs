//! The error type returned by this crate.

use std::fmt;

/// The wire-level error taxonomy from the JSON-RPC error envelope (§6.4).
///
/// `ScoreDefined` covers the `-30000..=-30999` contract-defined range; the
/// exact code is kept alongside it on [`Error::Rpc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    SystemError,
    PoolOverflow,
    Pending,
    Executing,
    NotFound,
    LackOfResource,
    Timeout,
    SystemTimeout,
    ScoreDefined,
}

impl ErrorReason {
    /// Classify a wire error code into its reason tag.
    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::SystemError,
            -32001 => Self::PoolOverflow,
            -32002 => Self::Pending,
            -32003 => Self::Executing,
            -32004 => Self::NotFound,
            -32005 => Self::LackOfResource,
            -32006 => Self::Timeout,
            -32007 => Self::SystemTimeout,
            -30999..=-30000 => Self::ScoreDefined,
            _ => Self::InternalError,
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParseError => "parse_error",
            Self::InvalidRequest => "invalid_request",
            Self::MethodNotFound => "method_not_found",
            Self::InvalidParams => "invalid_params",
            Self::InternalError => "internal_error",
            Self::SystemError => "system_error",
            Self::PoolOverflow => "pool_overflow",
            Self::Pending => "pending",
            Self::Executing => "executing",
            Self::NotFound => "not_found",
            Self::LackOfResource => "lack_of_resource",
            Self::Timeout => "timeout",
            Self::SystemTimeout => "system_timeout",
            Self::ScoreDefined => "score_defined",
        };
        write!(f, "{s}")
    }
}

/// The underlying error enum for the whole crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value failed to load or dump through a scalar codec.
    #[error("{path} is invalid")]
    ScalarInvalid { path: String },

    /// Schema validation failed; `message` is the flattened, dotted-path
    /// description required by §7 (e.g. `data.params.address is invalid`).
    #[error("{message}")]
    Schema { message: String, paths: Vec<String> },

    /// A required field was absent (or was `null`/`""`, which are treated as
    /// absent per the empty-value convention).
    #[error("{path} is required")]
    Required { path: String },

    /// A programmer error: an unknown scalar tag, or `{any,...}` nested
    /// beneath `{list,...}`. These are not supposed to reach callers and so
    /// are modeled distinctly from validation failures.
    #[error("invalid schema definition: {0}")]
    InvalidSchema(String),

    /// Signing was requested on an identity with no private key.
    #[error("identity must have a wallet")]
    NoWallet,

    /// A send (or a call requiring `from`) was requested on an identity with
    /// no derivable address.
    #[error("Invalid identity")]
    InvalidIdentity,

    /// A signature failed to verify against the claimed `from` address.
    #[error("signature verification failed")]
    VerificationFailed,

    /// The stream decoder received a frame it cannot interpret. The driver
    /// MUST treat this as a protocol violation, not a recoverable condition.
    #[error("malformed stream frame: {0}")]
    MalformedFrame(String),

    /// A filter given to a stream constructor had no `event`.
    #[error("event filters must specify an event signature")]
    FilterMissingEvent,

    /// Surfaced by the node over JSON-RPC, or by the HTTP/websocket
    /// transport collaborator standing in for a network failure.
    #[error("[{reason}] ({code}) {message}")]
    Rpc {
        code: i64,
        reason: ErrorReason,
        message: String,
    },

    /// secp256k1 signing/recovery failure.
    #[error("secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),

    /// hex decode failure at a crate boundary (e.g. a caller-supplied private key).
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// base64 decode failure (signatures).
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// JSON (de)serialization failure at the transport boundary.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An invalid node URL.
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    /// Catch-all for collaborator-reported errors (transport failures etc.)
    /// that this crate does not itself produce but must propagate.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a §6.4 `invalid_params` error carrying a dotted-path message,
    /// the shape every schema validation failure in this crate takes.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Error::Rpc {
            code: -32602,
            reason: ErrorReason::InvalidParams,
            message: message.into(),
        }
    }

    /// Build a §6.4 `system_error`, the shape network/transport failures take.
    pub fn system_error(message: impl Into<String>) -> Self {
        Error::Rpc {
            code: -32000,
            reason: ErrorReason::SystemError,
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_codes() {
        assert_eq!(ErrorReason::from_code(-32602), ErrorReason::InvalidParams);
        assert_eq!(ErrorReason::from_code(-32000), ErrorReason::SystemError);
        assert_eq!(ErrorReason::from_code(-30042), ErrorReason::ScoreDefined);
    }

    #[test]
    fn display_matches_reason_tag() {
        assert_eq!(ErrorReason::InvalidParams.to_string(), "invalid_params");
    }
}
