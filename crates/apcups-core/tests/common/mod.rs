#![allow(dead_code)]

use std::collections::VecDeque;

use apcups_snmp::{Error, OidKey, PduOutcome, RawScalar, SnmpSession, UpsSnmpClient, oid::apc};

/// Session that replays a fixed script of responses, one per request.
/// An exhausted script answers like an unreachable agent.
pub struct ScriptedSession {
    responses: VecDeque<Result<PduOutcome, Error>>,
}

impl ScriptedSession {
    pub fn new(responses: Vec<Result<PduOutcome, Error>>) -> Self {
        Self {
            responses: responses.into(),
        }
    }
}

impl SnmpSession for ScriptedSession {
    async fn request(&mut self, _oids: &[OidKey]) -> Result<PduOutcome, Error> {
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(connection_error()))
    }
}

pub fn client(responses: Vec<Result<PduOutcome, Error>>) -> UpsSnmpClient<ScriptedSession> {
    UpsSnmpClient::with_session(ScriptedSession::new(responses), "ups.local:161")
}

pub fn outcome(varbinds: &[(&str, RawScalar)]) -> PduOutcome {
    PduOutcome {
        error_status: 0,
        error_index: 0,
        varbinds: varbinds
            .iter()
            .map(|(oid, value)| (OidKey::new(oid), value.clone()))
            .collect(),
    }
}

/// A plausible poll response with the given battery capacity.
pub fn poll_outcome(capacity: i64) -> PduOutcome {
    outcome(&[
        (apc::MODEL, RawScalar::OctetString(b"Smart-UPS 1500".to_vec())),
        (apc::SERIAL, RawScalar::OctetString(b"AS1234567890".to_vec())),
        (apc::BATTERY_CAPACITY, RawScalar::Integer(capacity)),
        (apc::BATTERY_RUNTIME, RawScalar::Timeticks(270_000)),
        (apc::OUTPUT_STATUS, RawScalar::Integer(2)),
        (apc::OUTPUT_LOAD, RawScalar::Integer(23)),
    ])
}

/// The identity group as a healthy agent reports it.
pub fn identity_outcome() -> PduOutcome {
    outcome(&[
        (apc::MODEL, RawScalar::OctetString(b"Smart-UPS 1500".to_vec())),
        (apc::NAME, RawScalar::OctetString(b"rack-ups".to_vec())),
        (apc::FIRMWARE, RawScalar::OctetString(b"UPS 09.8".to_vec())),
        (apc::SERIAL, RawScalar::OctetString(b"AS1234567890".to_vec())),
        (
            apc::MANUFACTURE_DATE,
            RawScalar::OctetString(b"07/15/2022".to_vec()),
        ),
    ])
}

pub fn connection_error() -> Error {
    Error::Connection {
        endpoint: "ups.local:161".into(),
        message: "connection refused".into(),
    }
}

pub fn auth_error() -> Error {
    Error::Authentication {
        message: "wrong community".into(),
    }
}
