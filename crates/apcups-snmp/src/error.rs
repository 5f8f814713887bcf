use thiserror::Error;

/// Top-level error type for the `apcups-snmp` crate.
///
/// Every transport failure is classified exactly once, at the session
/// boundary, into one of three mutually exclusive classes. Callers can
/// branch on the variant without inspecting message text.
#[derive(Debug, Error)]
pub enum Error {
    /// The agent did not answer within the configured window.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The agent rejected the community string or USM credentials.
    #[error("Authentication failed -- check credentials: {message}")]
    Authentication { message: String },

    /// Anything else: unreachable host, socket errors, malformed replies.
    #[error("Unable to connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// A requested OID is not a valid dotted-numeric string.
    ///
    /// This is a caller bug, not a transport failure; the catalog OIDs
    /// never produce it.
    #[error("Invalid OID '{oid}'")]
    InvalidOid { oid: String },
}

impl Error {
    /// Returns `true` if this error indicates the agent rejected our
    /// credentials and a reconfiguration is needed.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying
    /// on the next poll cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }
}
