//! OID keys and the APC PowerNet MIB catalog.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::error::Error;

/// A dotted-numeric OID, normalized for use as a map key.
///
/// Stored without the leading dot so that `1.3.6...` and `.1.3.6...`
/// compare equal; `Display` renders the leading-dot form used in the
/// APC PowerNet documentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OidKey(String);

impl OidKey {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_start_matches('.').to_owned())
    }

    /// The normalized dotted form, without a leading dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric components, for handing to the SNMP engine.
    pub fn components(&self) -> Result<Vec<u64>, Error> {
        self.0
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| Error::InvalidOid {
                    oid: self.to_string(),
                })
            })
            .collect()
    }
}

impl From<&str> for OidKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for OidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.0)
    }
}

/// Drop duplicate OIDs while keeping the first occurrence of each in
/// its original position.
pub fn dedup_preserving_order(oids: &[OidKey]) -> Vec<OidKey> {
    let set: IndexSet<&OidKey> = oids.iter().collect();
    set.into_iter().cloned().collect()
}

/// APC PowerNet MIB object identifiers (enterprise 318).
pub mod apc {
    use super::OidKey;

    // Identity
    pub const MODEL: &str = ".1.3.6.1.4.1.318.1.1.1.1.1.1.0";
    pub const NAME: &str = ".1.3.6.1.4.1.318.1.1.1.1.1.2.0";
    pub const FIRMWARE: &str = ".1.3.6.1.4.1.318.1.1.1.1.2.1.0";
    pub const SERIAL: &str = ".1.3.6.1.4.1.318.1.1.1.1.2.2.0";
    pub const MANUFACTURE_DATE: &str = ".1.3.6.1.4.1.318.1.1.1.1.2.3.0";

    // Battery
    pub const BATTERY_STATUS: &str = ".1.3.6.1.4.1.318.1.1.1.2.1.1.0";
    pub const TIME_ON_BATTERY: &str = ".1.3.6.1.4.1.318.1.1.1.2.1.2.0";
    pub const BATTERY_CAPACITY: &str = ".1.3.6.1.4.1.318.1.1.1.2.2.1.0";
    pub const BATTERY_TEMPERATURE: &str = ".1.3.6.1.4.1.318.1.1.1.2.2.2.0";
    pub const BATTERY_RUNTIME: &str = ".1.3.6.1.4.1.318.1.1.1.2.2.3.0";
    pub const BATTERY_REPLACE: &str = ".1.3.6.1.4.1.318.1.1.1.2.2.4.0";
    pub const BATTERY_VOLTAGE: &str = ".1.3.6.1.4.1.318.1.1.1.2.2.8.0";

    // Input
    pub const INPUT_VOLTAGE: &str = ".1.3.6.1.4.1.318.1.1.1.3.2.1.0";
    pub const INPUT_FREQUENCY: &str = ".1.3.6.1.4.1.318.1.1.1.3.2.4.0";
    pub const LAST_TRANSFER_CAUSE: &str = ".1.3.6.1.4.1.318.1.1.1.3.2.5.0";

    // Output
    pub const OUTPUT_STATUS: &str = ".1.3.6.1.4.1.318.1.1.1.4.1.1.0";
    pub const OUTPUT_VOLTAGE: &str = ".1.3.6.1.4.1.318.1.1.1.4.2.1.0";
    pub const OUTPUT_FREQUENCY: &str = ".1.3.6.1.4.1.318.1.1.1.4.2.2.0";
    pub const OUTPUT_LOAD: &str = ".1.3.6.1.4.1.318.1.1.1.4.2.3.0";
    pub const OUTPUT_CURRENT: &str = ".1.3.6.1.4.1.318.1.1.1.4.2.4.0";
    pub const OUTPUT_POWER: &str = ".1.3.6.1.4.1.318.1.1.1.4.2.8.0";

    // Self-test
    pub const SELF_TEST_RESULT: &str = ".1.3.6.1.4.1.318.1.1.1.7.2.3.0";
    pub const SELF_TEST_DATE: &str = ".1.3.6.1.4.1.318.1.1.1.7.2.4.0";

    /// OIDs queried by `get_identity`.
    pub fn identity_oids() -> Vec<OidKey> {
        [MODEL, NAME, FIRMWARE, SERIAL, MANUFACTURE_DATE]
            .into_iter()
            .map(OidKey::new)
            .collect()
    }

    /// OIDs backing the numeric and enum sensors.
    pub fn sensor_oids() -> Vec<OidKey> {
        [
            BATTERY_CAPACITY,
            BATTERY_TEMPERATURE,
            BATTERY_RUNTIME,
            BATTERY_VOLTAGE,
            TIME_ON_BATTERY,
            INPUT_VOLTAGE,
            INPUT_FREQUENCY,
            LAST_TRANSFER_CAUSE,
            OUTPUT_STATUS,
            OUTPUT_VOLTAGE,
            OUTPUT_FREQUENCY,
            OUTPUT_LOAD,
            OUTPUT_CURRENT,
            OUTPUT_POWER,
        ]
        .into_iter()
        .map(OidKey::new)
        .collect()
    }

    /// OIDs backing the tri-state binary sensors.
    pub fn binary_sensor_oids() -> Vec<OidKey> {
        [BATTERY_STATUS, BATTERY_REPLACE, OUTPUT_STATUS]
            .into_iter()
            .map(OidKey::new)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn leading_dot_is_normalized_away() {
        assert_eq!(OidKey::new(".1.3.6.1"), OidKey::new("1.3.6.1"));
        assert_eq!(OidKey::new(".1.3.6.1").as_str(), "1.3.6.1");
    }

    #[test]
    fn display_renders_leading_dot() {
        assert_eq!(OidKey::new("1.3.6.1").to_string(), ".1.3.6.1");
    }

    #[test]
    fn components_parse_numeric_parts() {
        let oid = OidKey::new(".1.3.6.1.4.1.318");
        assert_eq!(oid.components().unwrap(), vec![1, 3, 6, 1, 4, 1, 318]);
    }

    #[test]
    fn components_reject_garbage() {
        let err = OidKey::new("1.3.abc.1").components().unwrap_err();
        assert!(matches!(err, Error::InvalidOid { .. }));
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let oids: Vec<OidKey> = ["1.1", "1.2", "1.1", "1.3", ".1.2"]
            .into_iter()
            .map(OidKey::new)
            .collect();
        let unique = dedup_preserving_order(&oids);
        assert_eq!(
            unique,
            vec![OidKey::new("1.1"), OidKey::new("1.2"), OidKey::new("1.3")]
        );
    }

    #[test]
    fn identity_and_data_oids_are_valid() {
        for oid in apc::identity_oids()
            .into_iter()
            .chain(apc::sensor_oids())
            .chain(apc::binary_sensor_oids())
        {
            assert!(oid.components().is_ok(), "bad catalog OID: {oid}");
        }
    }
}
