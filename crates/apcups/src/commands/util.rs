//! Shared helpers for command handlers.

use std::time::Duration;

use secrecy::SecretString;

use apcups_snmp::{
    AuthAlgorithm, AuthCredential, ConnectionTarget, Credentials, PrivacyAlgorithm,
    PrivacyCredential, UserSecurity,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

const DEFAULT_COMMUNITY: &str = "public";

/// Assemble a connection target from the global flags.
///
/// A username switches to SNMPv3; otherwise v2c with the community
/// string (default "public"). Protocol flags fall back to SHA-1 and
/// AES-128 when only a passphrase is given.
pub fn build_target(global: &GlobalOpts) -> Result<ConnectionTarget, CliError> {
    let host = global.host.clone().ok_or_else(|| CliError::Validation {
        field: "host".into(),
        reason: "missing --host (or APCUPS_HOST)".into(),
    })?;
    let host = apcups_core::validate_host(&host)?;

    let credentials = if let Some(ref username) = global.username {
        let auth = global.auth_passphrase.as_ref().map(|passphrase| AuthCredential {
            algorithm: global.auth_protocol.map_or(AuthAlgorithm::Sha1, Into::into),
            passphrase: SecretString::from(passphrase.clone()),
        });
        let privacy = global.priv_passphrase.as_ref().map(|passphrase| PrivacyCredential {
            algorithm: global.priv_protocol.map_or(PrivacyAlgorithm::Aes128, Into::into),
            passphrase: SecretString::from(passphrase.clone()),
        });
        Credentials::UserSecurity(UserSecurity::new(username.clone(), auth, privacy)?)
    } else {
        let community = global
            .community
            .clone()
            .unwrap_or_else(|| DEFAULT_COMMUNITY.to_owned());
        Credentials::community(community)?
    };

    Ok(ConnectionTarget::new(host, credentials)
        .with_port(global.port)
        .with_timeout(Duration::from_secs(global.timeout)))
}
