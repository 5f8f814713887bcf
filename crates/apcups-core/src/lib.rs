// apcups-core: UPS polling coordination, sensor catalog and device setup

pub mod catalog;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod setup;
pub mod snapshot;

pub use catalog::{
    BINARY_SENSORS, BatteryStatus, BinarySensorSpec, DEFAULT_SENSORS, OutputStatus, Predicate,
    ProjectedValue, SENSORS, SelfTestResult, SensorSpec, Transform, TransferCause, sensor,
};
pub use coordinator::{
    DEFAULT_POLL_INTERVAL, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, PollConfig, PollState, PollStatus,
    UpsCoordinator,
};
pub use error::CoreError;
pub use setup::{DeviceEntry, DeviceRegistry, SetupFlow, validate_host};
pub use snapshot::UpsSnapshot;
