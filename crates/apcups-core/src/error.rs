use thiserror::Error;

/// Core-level error type.
///
/// Transport errors are folded in at exactly one place, the `From`
/// impl below; everything above the coordinator branches on these
/// variants instead of re-inspecting transport failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The agent rejected our credentials. Terminal until the device
    /// is reconfigured with working credentials.
    #[error("Authentication required: {message}")]
    AuthRequired { message: String },

    /// The UPS could not be polled this cycle. Transient; the next
    /// cycle retries.
    #[error("UPS not ready: {message}")]
    NotReady { message: String },

    /// A device with this serial number is already registered.
    #[error("A UPS with serial '{serial}' is already configured")]
    AlreadyConfigured { serial: String },

    /// Invalid user-supplied configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Returns `true` if retrying on a later poll cycle can help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

// Single translation point from the transport taxonomy.
impl From<apcups_snmp::Error> for CoreError {
    fn from(err: apcups_snmp::Error) -> Self {
        if err.is_auth_failure() {
            Self::AuthRequired {
                message: err.to_string(),
            }
        } else {
            Self::NotReady {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_auth_required() {
        let err = CoreError::from(apcups_snmp::Error::Authentication {
            message: "bad community".into(),
        });
        assert!(matches!(err, CoreError::AuthRequired { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn timeouts_and_connection_failures_are_transient() {
        let timeout = CoreError::from(apcups_snmp::Error::Timeout { timeout_secs: 5 });
        assert!(timeout.is_transient());

        let conn = CoreError::from(apcups_snmp::Error::Connection {
            endpoint: "ups.local:161".into(),
            message: "refused".into(),
        });
        assert!(conn.is_transient());
    }
}
