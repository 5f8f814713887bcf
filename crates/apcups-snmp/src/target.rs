//! Connection target and credential model.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Default SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credential construction errors.
///
/// Invalid combinations are rejected when credentials are built, so a
/// `Credentials` value is always usable by the session layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("community string must not be empty")]
    EmptyCommunity,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("privacy requires an authentication credential")]
    PrivacyWithoutAuth,
}

/// SNMP protocol version, derived from the credential variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V2c,
    V3,
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2c => f.write_str("v2c"),
            Self::V3 => f.write_str("v3"),
        }
    }
}

/// USM authentication digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// USM privacy ciphers.
///
/// The PowerNet cards also advertise 3DES, but the engine does not
/// implement it, so it is not offered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyAlgorithm {
    Des,
    Aes128,
    Aes192,
    Aes256,
}

/// An authentication credential: digest algorithm plus passphrase.
#[derive(Debug, Clone)]
pub struct AuthCredential {
    pub algorithm: AuthAlgorithm,
    pub passphrase: SecretString,
}

/// A privacy credential: cipher plus passphrase.
#[derive(Debug, Clone)]
pub struct PrivacyCredential {
    pub algorithm: PrivacyAlgorithm,
    pub passphrase: SecretString,
}

/// USM security level, derived from which credentials are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

/// Validated SNMPv3 user-security settings.
///
/// Fields are private; `UserSecurity::new` is the only way in, and it
/// rejects privacy-without-auth (there is no such USM level).
#[derive(Debug, Clone)]
pub struct UserSecurity {
    username: String,
    auth: Option<AuthCredential>,
    privacy: Option<PrivacyCredential>,
}

impl UserSecurity {
    pub fn new(
        username: impl Into<String>,
        auth: Option<AuthCredential>,
        privacy: Option<PrivacyCredential>,
    ) -> Result<Self, CredentialsError> {
        let username = username.into();
        if username.is_empty() {
            return Err(CredentialsError::EmptyUsername);
        }
        if privacy.is_some() && auth.is_none() {
            return Err(CredentialsError::PrivacyWithoutAuth);
        }
        Ok(Self {
            username,
            auth,
            privacy,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auth(&self) -> Option<&AuthCredential> {
        self.auth.as_ref()
    }

    pub fn privacy(&self) -> Option<&PrivacyCredential> {
        self.privacy.as_ref()
    }

    pub fn security_level(&self) -> SecurityLevel {
        match (&self.auth, &self.privacy) {
            (None, _) => SecurityLevel::NoAuthNoPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
        }
    }
}

/// How to authenticate against the agent.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// SNMPv2c community string.
    Community(SecretString),

    /// SNMPv3 user-based security.
    UserSecurity(UserSecurity),
}

impl Credentials {
    /// Build v2c credentials from a community string.
    pub fn community(community: impl Into<String>) -> Result<Self, CredentialsError> {
        let community = community.into();
        if community.is_empty() {
            return Err(CredentialsError::EmptyCommunity);
        }
        Ok(Self::Community(SecretString::from(community)))
    }

    /// The protocol version these credentials imply.
    pub fn version(&self) -> SnmpVersion {
        match self {
            Self::Community(_) => SnmpVersion::V2c,
            Self::UserSecurity(_) => SnmpVersion::V3,
        }
    }
}

/// Where and how to reach a UPS agent. Immutable for the lifetime of a
/// client; reconfiguration means building a new client.
#[derive(Debug, Clone)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub credentials: Credentials,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            credentials,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` form, used in connection error messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
