//! CLI error types with miette diagnostics.
//!
//! Maps transport and core errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use apcups_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the UPS at {endpoint}")]
    #[diagnostic(
        code(apcups::connection_failed),
        help(
            "Check that the network management card is online and SNMP is enabled.\n\
             Endpoint: {endpoint}\n\
             Detail: {message}"
        )
    )]
    ConnectionFailed { endpoint: String, message: String },

    #[error("UPS not ready: {message}")]
    #[diagnostic(
        code(apcups::not_ready),
        help("The agent answered, but not like an APC UPS. Verify the host and port.")
    )]
    NotReady { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(apcups::auth_failed),
        help(
            "Verify the community string (v2c) or username and passphrases (v3).\n\
             {message}"
        )
    )]
    AuthFailed { message: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(apcups::timeout),
        help("Increase --timeout or check UPS responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(apcups::validation))]
    Validation { field: String, reason: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(apcups::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NotReady { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Transport / core error mapping ───────────────────────────────────

impl From<apcups_snmp::Error> for CliError {
    fn from(err: apcups_snmp::Error) -> Self {
        match err {
            apcups_snmp::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            apcups_snmp::Error::Authentication { message } => Self::AuthFailed { message },
            apcups_snmp::Error::Connection { endpoint, message } => {
                Self::ConnectionFailed { endpoint, message }
            }
            apcups_snmp::Error::InvalidOid { oid } => Self::Validation {
                field: "oid".into(),
                reason: format!("malformed OID: {oid}"),
            },
        }
    }
}

impl From<apcups_snmp::CredentialsError> for CliError {
    fn from(err: apcups_snmp::CredentialsError) -> Self {
        Self::Validation {
            field: "credentials".into(),
            reason: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthRequired { message } => Self::AuthFailed { message },
            CoreError::NotReady { message } => Self::NotReady { message },
            CoreError::InvalidConfig { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::AlreadyConfigured { serial } => Self::Validation {
                field: "serial".into(),
                reason: format!("UPS '{serial}' is already configured"),
            },
        }
    }
}
