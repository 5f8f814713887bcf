//! Wire scalars and the coerced value model.

use std::fmt;

use serde::{Serialize, Serializer};

/// An owned copy of a scalar from a GET response varbind.
///
/// The engine hands back values borrowing the receive buffer; these are
/// detached so they can outlive the session.
#[derive(Debug, Clone, PartialEq)]
pub enum RawScalar {
    Boolean(bool),
    Null,
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectIdentifier(String),
    IpAddress([u8; 4]),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Opaque(Vec<u8>),
    Counter64(u64),
    /// Agent reported the object does not exist.
    NoSuchObject,
    /// Agent reported the instance does not exist.
    NoSuchInstance,
    /// GETNEXT/GETBULK walked off the end of the MIB.
    EndOfMibView,
}

impl RawScalar {
    /// Textual rendering of the scalar, or `None` for the absent
    /// sentinels (noSuchObject, noSuchInstance, endOfMibView).
    pub fn render(&self) -> Option<String> {
        match self {
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView => None,
            Self::Boolean(b) => Some(b.to_string()),
            Self::Null => Some(String::new()),
            Self::Integer(n) => Some(n.to_string()),
            Self::OctetString(bytes) | Self::Opaque(bytes) => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            Self::ObjectIdentifier(oid) => Some(oid.clone()),
            Self::IpAddress(octets) => Some(format!(
                "{}.{}.{}.{}",
                octets[0], octets[1], octets[2], octets[3]
            )),
            Self::Counter32(n) | Self::Unsigned32(n) | Self::Timeticks(n) => Some(n.to_string()),
            Self::Counter64(n) => Some(n.to_string()),
        }
    }
}

/// A UPS data point after coercion.
///
/// Coercion always tries integer first, then float, then falls back to
/// text, so `"100"` becomes `Int(100)` and `"49.8"` becomes
/// `Float(49.8)` regardless of the wire type that carried it.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsValue {
    /// The agent has no value for this OID.
    Absent,
    Int(i64),
    Float(f64),
    Text(String),
}

impl UpsValue {
    /// Coerce a wire scalar into the value model.
    pub fn from_raw(raw: &RawScalar) -> Self {
        match raw.render() {
            None => Self::Absent,
            Some(text) => Self::coerce(&text),
        }
    }

    /// Coerce a textual rendering: integer parse, then float parse,
    /// then text. The order matters -- `"100"` must stay integral.
    pub fn coerce(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(f) = text.parse::<f64>() {
            return Self::Float(f);
        }
        Self::Text(text.to_owned())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Numeric view, if the value is numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Absent | Self::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for UpsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for UpsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("-"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn integer_parse_wins_over_float() {
        assert_eq!(UpsValue::coerce("100"), UpsValue::Int(100));
        assert_eq!(UpsValue::coerce("-42"), UpsValue::Int(-42));
    }

    #[test]
    fn float_parse_wins_over_text() {
        assert_eq!(UpsValue::coerce("49.8"), UpsValue::Float(49.8));
        assert_eq!(UpsValue::coerce("1e3"), UpsValue::Float(1000.0));
    }

    #[test]
    fn non_numeric_stays_text() {
        assert_eq!(
            UpsValue::coerce("Smart-UPS 1500"),
            UpsValue::Text("Smart-UPS 1500".into())
        );
    }

    #[test]
    fn absent_sentinels_coerce_to_absent() {
        assert_eq!(UpsValue::from_raw(&RawScalar::NoSuchObject), UpsValue::Absent);
        assert_eq!(UpsValue::from_raw(&RawScalar::NoSuchInstance), UpsValue::Absent);
        assert_eq!(UpsValue::from_raw(&RawScalar::EndOfMibView), UpsValue::Absent);
    }

    #[test]
    fn wire_types_all_go_through_text_coercion() {
        assert_eq!(
            UpsValue::from_raw(&RawScalar::Timeticks(27_000_000)),
            UpsValue::Int(27_000_000)
        );
        assert_eq!(
            UpsValue::from_raw(&RawScalar::OctetString(b"230.1".to_vec())),
            UpsValue::Float(230.1)
        );
        assert_eq!(
            UpsValue::from_raw(&RawScalar::IpAddress([10, 0, 0, 1])),
            UpsValue::Text("10.0.0.1".into())
        );
    }

    #[test]
    fn serializes_absent_as_null() {
        let json = serde_json::to_string(&UpsValue::Absent).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&UpsValue::Float(100.0)).unwrap();
        assert_eq!(json, "100.0");
    }
}
