//! Immutable poll results.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use apcups_snmp::{OidKey, UpsValue};

/// One complete poll of the UPS.
///
/// Snapshots are immutable; each cycle replaces the whole thing, so a
/// reader never observes values from two different polls.
#[derive(Debug, Clone, Serialize)]
pub struct UpsSnapshot {
    pub values: IndexMap<OidKey, UpsValue>,
    pub taken_at: DateTime<Utc>,
}

impl UpsSnapshot {
    pub fn new(values: IndexMap<OidKey, UpsValue>) -> Self {
        Self {
            values,
            taken_at: Utc::now(),
        }
    }

    /// Value for an OID; OIDs the poll did not cover read as absent.
    pub fn value(&self, oid: &OidKey) -> UpsValue {
        self.values.get(oid).cloned().unwrap_or(UpsValue::Absent)
    }

    pub fn get(&self, oid: &OidKey) -> Option<&UpsValue> {
        self.values.get(oid)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn uncovered_oids_read_as_absent() {
        let snapshot = UpsSnapshot::new(IndexMap::new());
        assert_eq!(snapshot.value(&OidKey::new("1.2.3")), UpsValue::Absent);
    }

    #[test]
    fn covered_oids_return_their_value() {
        let mut values = IndexMap::new();
        values.insert(OidKey::new("1.2.3"), UpsValue::Int(42));
        let snapshot = UpsSnapshot::new(values);
        assert_eq!(snapshot.value(&OidKey::new(".1.2.3")), UpsValue::Int(42));
    }
}
