//! Data-driven sensor catalog.
//!
//! Every sensor is a row in a static table: an OID plus a transform
//! tag. Projection walks the table instead of baking per-sensor logic
//! into code, so adding a sensor means adding a row.

use std::fmt;

use serde::{Serialize, Serializer};
use strum::IntoStaticStr;

use apcups_snmp::{OidKey, UpsValue, oid::apc};

use crate::convert::{runtime_timeticks_to_minutes, timeticks_to_seconds, to_one_decimal};
use crate::snapshot::UpsSnapshot;

// ── Status vocabularies ──────────────────────────────────────────

/// Battery status codes (upsBasicBatteryStatus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BatteryStatus {
    Unknown,
    Normal,
    Low,
}

impl BatteryStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Normal,
            3 => Self::Low,
            _ => Self::Unknown,
        }
    }
}

/// Output status codes (upsBasicOutputStatus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OutputStatus {
    Unknown,
    Online,
    OnBattery,
    SmartBoost,
    TimedSleeping,
    SoftwareBypass,
    Off,
    Rebooting,
    SwitchedBypass,
    HardwareFailureBypass,
    SleepingUntilPowerReturn,
    SmartTrim,
    EcoMode,
    HotStandby,
    BatteryTest,
}

impl OutputStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Online,
            3 => Self::OnBattery,
            4 => Self::SmartBoost,
            5 => Self::TimedSleeping,
            6 => Self::SoftwareBypass,
            7 => Self::Off,
            8 => Self::Rebooting,
            9 => Self::SwitchedBypass,
            10 => Self::HardwareFailureBypass,
            11 => Self::SleepingUntilPowerReturn,
            12 => Self::SmartTrim,
            13 => Self::EcoMode,
            14 => Self::HotStandby,
            15 => Self::BatteryTest,
            _ => Self::Unknown,
        }
    }
}

/// Self-test result codes (upsAdvTestDiagnosticsResults).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SelfTestResult {
    Ok,
    Failed,
    Invalid,
    InProgress,
}

impl SelfTestResult {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Ok),
            2 => Some(Self::Failed),
            3 => Some(Self::Invalid),
            4 => Some(Self::InProgress),
            _ => None,
        }
    }
}

/// Last transfer cause codes (upsAdvInputLineFailCause).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TransferCause {
    NoTransfer,
    HighLineVoltage,
    Brownout,
    Blackout,
    SmallMomentarySag,
    DeepMomentarySag,
    SmallMomentarySpike,
    LargeMomentarySpike,
    SelfTest,
    RateOfVoltageChange,
}

impl TransferCause {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::NoTransfer),
            2 => Some(Self::HighLineVoltage),
            3 => Some(Self::Brownout),
            4 => Some(Self::Blackout),
            5 => Some(Self::SmallMomentarySag),
            6 => Some(Self::DeepMomentarySag),
            7 => Some(Self::SmallMomentarySpike),
            8 => Some(Self::LargeMomentarySpike),
            9 => Some(Self::SelfTest),
            10 => Some(Self::RateOfVoltageChange),
            _ => None,
        }
    }
}

// ── Transforms ───────────────────────────────────────────────────

/// Operation tag applied to a raw value during projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Round to one decimal, forcing a float representation.
    OneDecimal,
    /// Runtime timeticks to minutes.
    RuntimeTicksToMinutes,
    /// Timeticks to seconds.
    TicksToSeconds,
    /// Output status code to its enum label.
    OutputStatusLabel,
    /// Transfer cause code to its enum label.
    TransferCauseLabel,
    /// Self-test result code to its enum label.
    SelfTestLabel,
}

/// A projected sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectedValue {
    /// The source value was absent or not interpretable.
    Unknown,
    Number(f64),
    Label(&'static str),
}

impl Transform {
    pub fn apply(self, value: &UpsValue) -> ProjectedValue {
        match self {
            Self::OneDecimal => number(value, to_one_decimal),
            Self::RuntimeTicksToMinutes => number(value, runtime_timeticks_to_minutes),
            Self::TicksToSeconds => number(value, timeticks_to_seconds),
            Self::OutputStatusLabel => value.as_i64().map_or(ProjectedValue::Unknown, |code| {
                ProjectedValue::Label(OutputStatus::from_code(code).into())
            }),
            Self::TransferCauseLabel => value.as_i64().map_or(ProjectedValue::Unknown, |code| {
                TransferCause::from_code(code)
                    .map_or(ProjectedValue::Label("unknown"), |cause| {
                        ProjectedValue::Label(cause.into())
                    })
            }),
            Self::SelfTestLabel => value
                .as_i64()
                .and_then(SelfTestResult::from_code)
                .map_or(ProjectedValue::Unknown, |result| {
                    ProjectedValue::Label(result.into())
                }),
        }
    }
}

fn number(value: &UpsValue, convert: fn(f64) -> f64) -> ProjectedValue {
    value
        .as_f64()
        .map_or(ProjectedValue::Unknown, |v| ProjectedValue::Number(convert(v)))
}

impl fmt::Display for ProjectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            // Every numeric transform rounds to one decimal.
            Self::Number(v) => write!(f, "{v:.1}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for ProjectedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => serializer.serialize_none(),
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

// ── Sensor table ─────────────────────────────────────────────────

/// One selectable sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub oid: &'static str,
    pub unit: Option<&'static str>,
    pub transform: Transform,
}

impl SensorSpec {
    /// Project this sensor's value out of a snapshot.
    pub fn project(&self, snapshot: &UpsSnapshot) -> ProjectedValue {
        self.transform.apply(&snapshot.value(&OidKey::new(self.oid)))
    }
}

pub const SENSORS: &[SensorSpec] = &[
    SensorSpec {
        key: "battery_capacity",
        label: "Battery Capacity",
        oid: apc::BATTERY_CAPACITY,
        unit: Some("%"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "battery_runtime",
        label: "Battery Runtime",
        oid: apc::BATTERY_RUNTIME,
        unit: Some("min"),
        transform: Transform::RuntimeTicksToMinutes,
    },
    SensorSpec {
        key: "battery_temperature",
        label: "Battery Temperature",
        oid: apc::BATTERY_TEMPERATURE,
        unit: Some("°C"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "battery_voltage",
        label: "Battery Voltage",
        oid: apc::BATTERY_VOLTAGE,
        unit: Some("V"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "time_on_battery",
        label: "Time On Battery",
        oid: apc::TIME_ON_BATTERY,
        unit: Some("s"),
        transform: Transform::TicksToSeconds,
    },
    SensorSpec {
        key: "input_voltage",
        label: "Input Voltage",
        oid: apc::INPUT_VOLTAGE,
        unit: Some("V"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "input_frequency",
        label: "Input Frequency",
        oid: apc::INPUT_FREQUENCY,
        unit: Some("Hz"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "last_transfer_cause",
        label: "Last Transfer Cause",
        oid: apc::LAST_TRANSFER_CAUSE,
        unit: None,
        transform: Transform::TransferCauseLabel,
    },
    SensorSpec {
        key: "output_voltage",
        label: "Output Voltage",
        oid: apc::OUTPUT_VOLTAGE,
        unit: Some("V"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "output_frequency",
        label: "Output Frequency",
        oid: apc::OUTPUT_FREQUENCY,
        unit: Some("Hz"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "output_load",
        label: "Output Load",
        oid: apc::OUTPUT_LOAD,
        unit: Some("%"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "output_current",
        label: "Output Current",
        oid: apc::OUTPUT_CURRENT,
        unit: Some("A"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "output_power",
        label: "Output Power",
        oid: apc::OUTPUT_POWER,
        unit: Some("W"),
        transform: Transform::OneDecimal,
    },
    SensorSpec {
        key: "ups_status",
        label: "UPS Status",
        oid: apc::OUTPUT_STATUS,
        unit: None,
        transform: Transform::OutputStatusLabel,
    },
];

/// Sensors enabled when the user picks none.
pub const DEFAULT_SENSORS: &[&str] = &[
    "battery_capacity",
    "battery_runtime",
    "output_load",
    "output_power",
    "last_transfer_cause",
    "ups_status",
];

/// Look up a sensor spec by key.
pub fn sensor(key: &str) -> Option<&'static SensorSpec> {
    SENSORS.iter().find(|spec| spec.key == key)
}

// ── Binary sensors ───────────────────────────────────────────────

/// Tri-state predicates over status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Output status equals on-battery.
    OnBattery,
    /// Battery replace indicator equals yes.
    ReplaceBattery,
    /// Battery status equals low.
    LowBattery,
}

const OUTPUT_STATUS_ON_BATTERY: i64 = 3;
const BATTERY_REPLACE_YES: i64 = 2;
const BATTERY_STATUS_LOW: i64 = 3;

/// One derived on/off indicator.
#[derive(Debug, Clone, Copy)]
pub struct BinarySensorSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub oid: &'static str,
    pub predicate: Predicate,
}

impl BinarySensorSpec {
    /// Evaluate against a snapshot. `None` means the source value was
    /// absent or non-numeric, i.e. the state is unknown.
    pub fn evaluate(&self, snapshot: &UpsSnapshot) -> Option<bool> {
        let code = snapshot.value(&OidKey::new(self.oid)).as_i64()?;
        Some(match self.predicate {
            Predicate::OnBattery => code == OUTPUT_STATUS_ON_BATTERY,
            Predicate::ReplaceBattery => code == BATTERY_REPLACE_YES,
            Predicate::LowBattery => code == BATTERY_STATUS_LOW,
        })
    }
}

pub const BINARY_SENSORS: &[BinarySensorSpec] = &[
    BinarySensorSpec {
        key: "on_battery",
        label: "On Battery",
        oid: apc::OUTPUT_STATUS,
        predicate: Predicate::OnBattery,
    },
    BinarySensorSpec {
        key: "replace_battery",
        label: "Replace Battery",
        oid: apc::BATTERY_REPLACE,
        predicate: Predicate::ReplaceBattery,
    },
    BinarySensorSpec {
        key: "low_battery",
        label: "Low Battery",
        oid: apc::BATTERY_STATUS,
        predicate: Predicate::LowBattery,
    },
];
