//! Guided device setup and the registry of configured devices.
//!
//! Setup walks the same steps regardless of transport outcome: name a
//! target, supply credentials, prove the device answers, pick sensors.
//! The serial number is the device identity; a UPS can only be
//! registered once.

use std::net::IpAddr;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use apcups_snmp::{
    ConnectionTarget, Credentials, SnmpSession, SnmpVersion, UpsIdentity, UpsSnmpClient,
};

use crate::catalog::{self, DEFAULT_SENSORS};
use crate::coordinator::{DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
use crate::error::CoreError;

/// Longest hostname we accept, per RFC 1123.
const MAX_HOST_LEN: usize = 253;

/// Fallback title when the agent does not report a model.
const FALLBACK_TITLE: &str = "APC UPS";

// ── Host validation ──────────────────────────────────────────────

/// Validate and normalize a user-supplied host. Accepts IP addresses
/// and RFC 1123 hostnames; returns the trimmed form.
pub fn validate_host(host: &str) -> Result<String, CoreError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(invalid("host must not be empty"));
    }
    if host.len() > MAX_HOST_LEN {
        return Err(invalid("host exceeds the maximum hostname length"));
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_owned());
    }
    for label in host.split('.') {
        let valid = !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if !valid {
            return Err(invalid(format!("'{host}' is not a valid hostname or IP address")));
        }
    }
    Ok(host.to_owned())
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidConfig {
        message: message.into(),
    }
}

// ── Setup flow ───────────────────────────────────────────────────

#[derive(Debug)]
enum Step {
    Target,
    Credentials {
        host: String,
        port: u16,
        version: SnmpVersion,
    },
    ConnectionTest {
        target: ConnectionTarget,
    },
    Sensors {
        target: ConnectionTarget,
        identity: UpsIdentity,
        serial: String,
    },
    Finish {
        target: ConnectionTarget,
        identity: UpsIdentity,
        serial: String,
        sensors: Vec<String>,
    },
}

/// Step machine for configuring one UPS.
///
/// Each step validates its own input and advances; a step invoked out
/// of order is an [`CoreError::InvalidConfig`]. The flow never touches
/// the network itself, it borrows a client the caller built from
/// [`target`](Self::target).
#[derive(Debug)]
pub struct SetupFlow {
    step: Step,
}

impl Default for SetupFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupFlow {
    pub fn new() -> Self {
        Self { step: Step::Target }
    }

    /// Step 1: where the UPS lives and which protocol version to use.
    pub fn submit_target(
        &mut self,
        host: &str,
        port: u16,
        version: SnmpVersion,
    ) -> Result<(), CoreError> {
        if !matches!(self.step, Step::Target) {
            return Err(out_of_order("target"));
        }
        let host = validate_host(host)?;
        self.step = Step::Credentials {
            host,
            port,
            version,
        };
        Ok(())
    }

    /// Step 2: credentials for the selected version.
    pub fn submit_credentials(&mut self, credentials: Credentials) -> Result<(), CoreError> {
        let Step::Credentials {
            host,
            port,
            version,
        } = &self.step
        else {
            return Err(out_of_order("credentials"));
        };
        if credentials.version() != *version {
            return Err(invalid(format!(
                "credentials are for SNMP {}, but {} was selected",
                credentials.version(),
                version
            )));
        }
        let target = ConnectionTarget::new(host.clone(), credentials).with_port(*port);
        self.step = Step::ConnectionTest { target };
        Ok(())
    }

    /// The connection target assembled so far. Callers build a client
    /// from this for [`run_connection_test`](Self::run_connection_test).
    pub fn target(&self) -> Result<ConnectionTarget, CoreError> {
        match &self.step {
            Step::ConnectionTest { target }
            | Step::Sensors { target, .. }
            | Step::Finish { target, .. } => Ok(target.clone()),
            _ => Err(out_of_order("connection test")),
        }
    }

    /// Step 3: prove the device answers and identify it. The serial
    /// number is mandatory; without it there is no stable identity to
    /// register under.
    pub async fn run_connection_test<S: SnmpSession>(
        &mut self,
        client: &UpsSnmpClient<S>,
    ) -> Result<UpsIdentity, CoreError> {
        let Step::ConnectionTest { target } = &self.step else {
            return Err(out_of_order("connection test"));
        };

        if !client.test_connection().await? {
            return Err(CoreError::NotReady {
                message: format!("no UPS model reported by {}", client.endpoint()),
            });
        }
        let identity = client.get_identity().await?;
        let Some(serial) = identity.serial.clone() else {
            return Err(invalid("UPS did not report a serial number"));
        };
        info!(
            serial = %serial,
            model = identity.model.as_deref().unwrap_or("?"),
            "connection test passed"
        );

        self.step = Step::Sensors {
            target: target.clone(),
            identity: identity.clone(),
            serial,
        };
        Ok(identity)
    }

    /// Step 4: pick sensors. An empty selection falls back to the
    /// default set; unknown keys are rejected.
    pub fn select_sensors(&mut self, keys: &[String]) -> Result<(), CoreError> {
        let Step::Sensors {
            target,
            identity,
            serial,
        } = &self.step
        else {
            return Err(out_of_order("sensor selection"));
        };

        let sensors: Vec<String> = if keys.is_empty() {
            DEFAULT_SENSORS.iter().map(|&k| k.to_owned()).collect()
        } else {
            for key in keys {
                if catalog::sensor(key).is_none() {
                    return Err(invalid(format!("unknown sensor '{key}'")));
                }
            }
            keys.to_vec()
        };

        self.step = Step::Finish {
            target: target.clone(),
            identity: identity.clone(),
            serial: serial.clone(),
            sensors,
        };
        Ok(())
    }

    /// Final step: register the device. Fails if a UPS with the same
    /// serial is already configured.
    pub fn finish(self, registry: &mut DeviceRegistry) -> Result<DeviceEntry, CoreError> {
        let Step::Finish {
            target,
            identity,
            serial,
            sensors,
        } = self.step
        else {
            return Err(out_of_order("finish"));
        };

        let entry = DeviceEntry {
            serial,
            title: identity
                .model
                .unwrap_or_else(|| FALLBACK_TITLE.to_owned()),
            host: target.host,
            port: target.port,
            sensors,
            poll_interval: DEFAULT_POLL_INTERVAL,
        };
        registry.register(entry.clone())?;
        Ok(entry)
    }
}

fn out_of_order(step: &str) -> CoreError {
    invalid(format!("setup is not at the {step} step"))
}

// ── Device registry ──────────────────────────────────────────────

/// One configured UPS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceEntry {
    pub serial: String,
    pub title: String,
    pub host: String,
    pub port: u16,
    pub sensors: Vec<String>,
    pub poll_interval: Duration,
}

/// Configured devices, keyed by serial number.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    entries: IndexMap<String, DeviceEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device. A serial can only be registered once.
    pub fn register(&mut self, entry: DeviceEntry) -> Result<(), CoreError> {
        if self.entries.contains_key(&entry.serial) {
            return Err(CoreError::AlreadyConfigured {
                serial: entry.serial,
            });
        }
        debug!(serial = %entry.serial, title = %entry.title, "device registered");
        self.entries.insert(entry.serial.clone(), entry);
        Ok(())
    }

    /// Adjust sensors and poll interval after setup. The interval is
    /// clamped into the supported range; no connection re-test happens
    /// here since the credentials are unchanged.
    pub fn update_options(
        &mut self,
        serial: &str,
        sensors: Option<Vec<String>>,
        poll_interval: Option<Duration>,
    ) -> Result<&DeviceEntry, CoreError> {
        let entry = self.entries.get_mut(serial).ok_or_else(|| {
            invalid(format!("no configured UPS with serial '{serial}'"))
        })?;
        if let Some(sensors) = sensors {
            for key in &sensors {
                if catalog::sensor(key).is_none() {
                    return Err(invalid(format!("unknown sensor '{key}'")));
                }
            }
            entry.sensors = if sensors.is_empty() {
                DEFAULT_SENSORS.iter().map(|&k| k.to_owned()).collect()
            } else {
                sensors
            };
        }
        if let Some(interval) = poll_interval {
            entry.poll_interval = interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        }
        Ok(entry)
    }

    pub fn get(&self, serial: &str) -> Option<&DeviceEntry> {
        self.entries.get(serial)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
