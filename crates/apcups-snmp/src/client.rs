//! Batched GET client for APC UPS agents.

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::oid::{OidKey, apc, dedup_preserving_order};
use crate::pool::SnmpWorkerPool;
use crate::session::{Snmp2Session, SnmpSession};
use crate::target::ConnectionTarget;
use crate::value::UpsValue;

/// UPS identity as reported by the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsIdentity {
    pub model: Option<String>,
    pub name: Option<String>,
    pub firmware: Option<String>,
    pub serial: Option<String>,
    pub manufacture_date: Option<String>,
}

/// SNMP client for one UPS.
///
/// All reads go through a single shared work pool and one session, so
/// requests to the same device never interleave on the wire. The
/// client is cheap to create; no I/O happens until the first request.
pub struct UpsSnmpClient<S = Snmp2Session> {
    session: Mutex<S>,
    endpoint: String,
    pool: SnmpWorkerPool,
}

impl UpsSnmpClient<Snmp2Session> {
    pub fn new(target: ConnectionTarget) -> Self {
        let endpoint = target.endpoint();
        Self::with_session(Snmp2Session::new(target), endpoint)
    }
}

impl<S: SnmpSession> UpsSnmpClient<S> {
    /// Wrap an existing session. This is the seam tests use to inject
    /// scripted sessions.
    pub fn with_session(session: S, endpoint: impl Into<String>) -> Self {
        Self {
            session: Mutex::new(session),
            endpoint: endpoint.into(),
            pool: SnmpWorkerPool::shared(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probe the agent by reading the UPS model. Returns whether the
    /// agent reported a model value; transport failures are errors.
    pub async fn test_connection(&self) -> Result<bool, Error> {
        let value = self.get_one(&OidKey::new(apc::MODEL)).await?;
        Ok(!value.is_absent())
    }

    /// Read a single OID. Missing objects come back as
    /// [`UpsValue::Absent`], not as errors.
    pub async fn get_one(&self, oid: &OidKey) -> Result<UpsValue, Error> {
        let mut values = self.fetch(std::slice::from_ref(oid)).await?;
        Ok(values.swap_remove(oid).unwrap_or(UpsValue::Absent))
    }

    /// Read a batch of OIDs in one GET exchange.
    ///
    /// Duplicates are dropped (first occurrence wins) and the result
    /// map preserves the request order, so permuting or repeating the
    /// input changes neither the wire request size nor the value each
    /// key maps to.
    pub async fn get_many(&self, oids: &[OidKey]) -> Result<IndexMap<OidKey, UpsValue>, Error> {
        self.fetch(oids).await
    }

    /// Read the identity group (model, name, firmware, serial,
    /// manufacture date).
    pub async fn get_identity(&self) -> Result<UpsIdentity, Error> {
        let values = self.fetch(&apc::identity_oids()).await?;
        let text = |oid: &str| -> Option<String> {
            values.get(&OidKey::new(oid)).and_then(|v| match v {
                UpsValue::Absent => None,
                other => Some(other.to_string()),
            })
        };
        Ok(UpsIdentity {
            model: text(apc::MODEL),
            name: text(apc::NAME),
            firmware: text(apc::FIRMWARE),
            serial: text(apc::SERIAL),
            manufacture_date: text(apc::MANUFACTURE_DATE),
        })
    }

    /// Read everything the integration consumes: identity, sensor and
    /// binary-sensor OIDs, deduplicated into one GET.
    pub async fn get_all_data(&self) -> Result<IndexMap<OidKey, UpsValue>, Error> {
        let mut oids = apc::identity_oids();
        oids.extend(apc::sensor_oids());
        oids.extend(apc::binary_sensor_oids());
        let values = self.fetch(&oids).await?;
        debug!(count = values.len(), "fetched OID values from UPS");
        Ok(values)
    }

    /// Release the client. The engine needs no explicit teardown; this
    /// exists so callers have a stable shutdown point.
    pub async fn close(&self) {
        debug!(endpoint = %self.endpoint, "closing SNMP client");
    }

    async fn fetch(&self, oids: &[OidKey]) -> Result<IndexMap<OidKey, UpsValue>, Error> {
        let unique = dedup_preserving_order(oids);
        let outcome = self
            .pool
            .run(async {
                let mut session = self.session.lock().await;
                session.request(&unique).await
            })
            .await?;

        // Every requested OID gets an entry; anything the agent did
        // not answer stays Absent.
        let mut values: IndexMap<OidKey, UpsValue> = unique
            .iter()
            .map(|oid| (oid.clone(), UpsValue::Absent))
            .collect();
        for (oid, raw) in &outcome.varbinds {
            if let Some(slot) = values.get_mut(oid) {
                *slot = UpsValue::from_raw(raw);
            } else {
                trace!(%oid, "ignoring unsolicited varbind");
            }
        }

        if outcome.error_status != 0 {
            degrade_errored_varbind(&outcome, &mut values);
        }

        Ok(values)
    }
}

/// A nonzero PDU error-status names one failing varbind via the
/// 1-based error-index. That value is logged and treated as absent; an
/// index outside the varbind list is logged against an unknown marker
/// instead.
fn degrade_errored_varbind(
    outcome: &crate::session::PduOutcome,
    values: &mut IndexMap<OidKey, UpsValue>,
) {
    let index = usize::try_from(outcome.error_index).unwrap_or(usize::MAX);
    if index >= 1 && index <= outcome.varbinds.len() {
        if let Some((oid, _)) = outcome.varbinds.get(index - 1) {
            warn!(
                oid = %oid,
                status = outcome.error_status,
                "SNMP error reported for varbind, treating value as absent"
            );
            if let Some(slot) = values.get_mut(oid) {
                *slot = UpsValue::Absent;
            }
        }
    } else {
        warn!(
            oid = "?",
            status = outcome.error_status,
            index = outcome.error_index,
            "SNMP error reported at out-of-range varbind index"
        );
    }
}
