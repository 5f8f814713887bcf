//! Session seam over the SNMP engine.
//!
//! `SnmpSession` is the one trait the rest of the stack talks through;
//! tests substitute scripted sessions, production uses [`Snmp2Session`].
//! Every engine failure is classified here, once, into the crate's
//! [`Error`] taxonomy -- nothing downstream inspects message strings.

use std::future::Future;
use std::io;

use secrecy::ExposeSecret;
use snmp2::{AsyncSession, Oid, v3};
use tracing::{debug, trace};

use crate::error::Error;
use crate::oid::OidKey;
use crate::target::{
    AuthAlgorithm, ConnectionTarget, Credentials, PrivacyAlgorithm, SecurityLevel, UserSecurity,
};
use crate::value::RawScalar;

/// A decoded GET response: PDU-level error fields plus detached varbinds.
#[derive(Debug, Clone, Default)]
pub struct PduOutcome {
    pub error_status: u32,
    pub error_index: u32,
    pub varbinds: Vec<(OidKey, RawScalar)>,
}

/// One GET exchange against an agent.
///
/// Implementations own their transport state; the client serializes
/// access, so `&mut self` is enough.
pub trait SnmpSession: Send {
    fn request(&mut self, oids: &[OidKey])
    -> impl Future<Output = Result<PduOutcome, Error>> + Send;
}

/// Production session backed by the `snmp2` engine.
///
/// A fresh UDP session is opened per exchange, mirroring how the
/// management cards expect short-lived v3 contexts; the engine
/// discovery for v3 runs inside the request timeout.
pub struct Snmp2Session {
    target: ConnectionTarget,
    next_req_id: i32,
}

impl Snmp2Session {
    pub fn new(target: ConnectionTarget) -> Self {
        Self {
            target,
            next_req_id: 1,
        }
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    async fn open(&mut self) -> Result<AsyncSession, ExchangeError> {
        let endpoint = self.target.endpoint();
        let req_id = self.next_req_id;
        self.next_req_id = self.next_req_id.wrapping_add(1);

        match &self.target.credentials {
            Credentials::Community(community) => {
                let session =
                    AsyncSession::new_v2c(endpoint.as_str(), community.expose_secret().as_bytes(), req_id)
                        .await?;
                Ok(session)
            }
            Credentials::UserSecurity(user) => {
                let security = build_security(user);
                let mut session =
                    AsyncSession::new_v3(endpoint.as_str(), req_id, security).await?;
                // Engine ID discovery round-trip.
                session.init().await?;
                Ok(session)
            }
        }
    }

    async fn exchange(&mut self, oids: &[Oid<'_>]) -> Result<PduOutcome, ExchangeError> {
        let mut session = self.open().await?;
        let refs: Vec<&Oid<'_>> = oids.iter().collect();
        let pdu = session.get_many(&refs).await?;

        let varbinds = pdu
            .varbinds
            .map(|(oid, value)| (OidKey::new(&oid.to_string()), detach(&value)))
            .collect();

        Ok(PduOutcome {
            error_status: pdu.error_status,
            error_index: pdu.error_index,
            varbinds,
        })
    }
}

impl SnmpSession for Snmp2Session {
    async fn request(&mut self, oids: &[OidKey]) -> Result<PduOutcome, Error> {
        let engine_oids = oids
            .iter()
            .map(engine_oid)
            .collect::<Result<Vec<_>, Error>>()?;
        let timeout = self.target.timeout;
        let timeout_secs = timeout.as_secs();

        // One retransmit on timeout, plus one repeat when the v3 engine
        // refreshes its security context mid-request.
        let mut attempts = 0;
        loop {
            attempts += 1;
            match tokio::time::timeout(timeout, self.exchange(&engine_oids)).await {
                Ok(Ok(outcome)) => return Ok(outcome),
                Ok(Err(ExchangeError::Engine(snmp2::Error::AuthUpdated))) if attempts == 1 => {
                    trace!("security context updated, repeating request");
                }
                Ok(Err(err)) => return Err(classify(&err, &self.target)),
                Err(_elapsed) if attempts == 1 => {
                    debug!(endpoint = %self.target.endpoint(), "request timed out, retransmitting");
                }
                Err(_elapsed) => return Err(Error::Timeout { timeout_secs }),
            }
        }
    }
}

// ── Engine error classification ──────────────────────────────────────

enum ExchangeError {
    Socket(io::Error),
    Engine(snmp2::Error),
}

impl From<io::Error> for ExchangeError {
    fn from(err: io::Error) -> Self {
        Self::Socket(err)
    }
}

impl From<snmp2::Error> for ExchangeError {
    fn from(err: snmp2::Error) -> Self {
        Self::Engine(err)
    }
}

fn classify(err: &ExchangeError, target: &ConnectionTarget) -> Error {
    match err {
        ExchangeError::Socket(e) => Error::Connection {
            endpoint: target.endpoint(),
            message: e.to_string(),
        },
        ExchangeError::Engine(e) => match e {
            snmp2::Error::CommunityMismatch
            | snmp2::Error::AuthFailure(_)
            | snmp2::Error::Crypto(_) => Error::Authentication {
                message: e.to_string(),
            },
            other => Error::Connection {
                endpoint: target.endpoint(),
                message: other.to_string(),
            },
        },
    }
}

// ── Wire conversions ─────────────────────────────────────────────────

fn engine_oid(key: &OidKey) -> Result<Oid<'static>, Error> {
    let parts = key.components()?;
    Oid::from(&parts).map_err(|_| Error::InvalidOid {
        oid: key.to_string(),
    })
}

fn detach(value: &snmp2::Value<'_>) -> RawScalar {
    match value {
        snmp2::Value::Boolean(b) => RawScalar::Boolean(*b),
        snmp2::Value::Integer(n) => RawScalar::Integer(*n),
        snmp2::Value::OctetString(bytes) => RawScalar::OctetString(bytes.to_vec()),
        snmp2::Value::ObjectIdentifier(oid) => RawScalar::ObjectIdentifier(oid.to_string()),
        snmp2::Value::IpAddress(octets) => RawScalar::IpAddress(*octets),
        snmp2::Value::Counter32(n) => RawScalar::Counter32(*n),
        snmp2::Value::Unsigned32(n) => RawScalar::Unsigned32(*n),
        snmp2::Value::Timeticks(n) => RawScalar::Timeticks(*n),
        snmp2::Value::Opaque(bytes) => RawScalar::Opaque(bytes.to_vec()),
        snmp2::Value::Counter64(n) => RawScalar::Counter64(*n),
        snmp2::Value::EndOfMibView => RawScalar::EndOfMibView,
        snmp2::Value::NoSuchObject => RawScalar::NoSuchObject,
        snmp2::Value::NoSuchInstance => RawScalar::NoSuchInstance,
        // Constructed and PDU variants never appear as GET varbind values.
        _ => RawScalar::Null,
    }
}

fn build_security(user: &UserSecurity) -> v3::Security {
    let auth_password: Vec<u8> = user
        .auth()
        .map(|a| a.passphrase.expose_secret().as_bytes().to_vec())
        .unwrap_or_default();
    let mut security = v3::Security::new(user.username().as_bytes(), &auth_password);

    match user.security_level() {
        SecurityLevel::NoAuthNoPriv => {
            security = security.with_auth(v3::Auth::NoAuthNoPriv);
        }
        SecurityLevel::AuthNoPriv => {
            if let Some(auth) = user.auth() {
                security = security.with_auth_protocol(auth_protocol(auth.algorithm));
            }
        }
        SecurityLevel::AuthPriv => {
            if let (Some(auth), Some(privacy)) = (user.auth(), user.privacy()) {
                security = security
                    .with_auth(v3::Auth::AuthPriv {
                        cipher: cipher(privacy.algorithm),
                        privacy_password: privacy.passphrase.expose_secret().as_bytes().to_vec(),
                    })
                    .with_auth_protocol(auth_protocol(auth.algorithm));
            }
        }
    }
    security
}

fn auth_protocol(algorithm: AuthAlgorithm) -> v3::AuthProtocol {
    match algorithm {
        AuthAlgorithm::Md5 => v3::AuthProtocol::Md5,
        AuthAlgorithm::Sha1 => v3::AuthProtocol::Sha1,
        AuthAlgorithm::Sha224 => v3::AuthProtocol::Sha224,
        AuthAlgorithm::Sha256 => v3::AuthProtocol::Sha256,
        AuthAlgorithm::Sha384 => v3::AuthProtocol::Sha384,
        AuthAlgorithm::Sha512 => v3::AuthProtocol::Sha512,
    }
}

fn cipher(algorithm: PrivacyAlgorithm) -> v3::Cipher {
    match algorithm {
        PrivacyAlgorithm::Des => v3::Cipher::Des,
        PrivacyAlgorithm::Aes128 => v3::Cipher::Aes128,
        PrivacyAlgorithm::Aes192 => v3::Cipher::Aes192,
        PrivacyAlgorithm::Aes256 => v3::Cipher::Aes256,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::target::Credentials;

    fn target() -> ConnectionTarget {
        ConnectionTarget::new("ups.local", Credentials::community("public").unwrap())
    }

    #[test]
    fn community_mismatch_classifies_as_authentication() {
        let err = classify(
            &ExchangeError::Engine(snmp2::Error::CommunityMismatch),
            &target(),
        );
        assert!(err.is_auth_failure());
    }

    #[test]
    fn socket_errors_classify_as_connection_with_endpoint() {
        let err = classify(
            &ExchangeError::Socket(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
            &target(),
        );
        match err {
            Error::Connection { endpoint, .. } => assert_eq!(endpoint, "ups.local:161"),
            other => panic!("expected Connection, got {other:?}"),
        }
    }

    #[test]
    fn protocol_errors_classify_as_connection() {
        let err = classify(
            &ExchangeError::Engine(snmp2::Error::AsnParse),
            &target(),
        );
        assert!(err.is_transient());
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn absent_sentinels_detach_losslessly() {
        assert_eq!(detach(&snmp2::Value::NoSuchObject), RawScalar::NoSuchObject);
        assert_eq!(
            detach(&snmp2::Value::NoSuchInstance),
            RawScalar::NoSuchInstance
        );
        assert_eq!(detach(&snmp2::Value::EndOfMibView), RawScalar::EndOfMibView);
    }

    #[test]
    fn scalars_detach_to_owned_copies() {
        assert_eq!(detach(&snmp2::Value::Integer(42)), RawScalar::Integer(42));
        assert_eq!(
            detach(&snmp2::Value::OctetString(b"Smart-UPS 1500")),
            RawScalar::OctetString(b"Smart-UPS 1500".to_vec())
        );
        assert_eq!(
            detach(&snmp2::Value::Timeticks(27_000_000)),
            RawScalar::Timeticks(27_000_000)
        );
    }
}
